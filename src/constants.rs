pub const MODEL_API_KEY_ENV_NAME: &str = "PAGEGIST_API_KEY";
pub const FALLBACK_API_KEY_ENV_NAME: &str = "GROQ_API_KEY";

pub const DEFAULT_MODEL: &str = "groq://llama-3.3-70b-versatile";
pub const SUGGESTED_MODELS: [&str; 4] = [
    "groq://llama-3.1-8b-instant",
    "groq://llama-3.3-70b-versatile",
    "groq://meta-llama/llama-4-maverick-17b-128e-instruct",
    "groq://qwen/qwen3-32b",
];
pub const MODEL_TEMPERATURE: f32 = 0.4;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const MIN_WEBPAGE_CHARS: usize = 200;
pub const WIKIPEDIA_MAX_CHARS: usize = 12_000;
pub const MAX_MODEL_INPUT_CHARS: usize = 15_000;
pub const CAPTION_LANGUAGES: [&str; 2] = ["en", "hi"];
pub const PRIMARY_REMOVE_SELECTORS: [&str; 1] = ["nav"];
pub const FALLBACK_REMOVE_SELECTORS: [&str; 3] = ["nav", "footer", "header"];

pub const TRANSCRIPTION_ENDPOINT: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
pub const TRANSCRIPTION_MODEL: &str = "whisper-large-v3";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const NORMAL_PROMPT_TEMPLATE: &str = r#"
You are an expert summarizer.
Write a clear, human-like summary of about {range} words of the content from {url}.
Open with a one or two sentence overview, then cover only the main ideas.
Write smooth, plain English. Do not repeat points and do not add opinions.
Your answer should contain only the summary.

Content to summarize:
{text}"#;

pub(crate) const BULLETS_PROMPT_TEMPLATE: &str = r#"
Turn the content from {url} into 10-15 compact bullet points, about {range} words in total.
Each bullet states one strong idea and no two bullets overlap.
Use simple English anyone can understand.
Your answer should contain only the bullet list.

Content:
{text}"#;

pub(crate) const HINDI_PROMPT_TEMPLATE: &str = r#"
IMPORTANT: Write ONLY in Hindi using Devanagari script. No Hinglish, no other scripts.

नीचे दिए गए कंटेंट ({url}) का लगभग {range} शब्दों में आसान और साफ़ हिंदी में सारांश लिखो।
- शुरुआत एक छोटे ओवरव्यू से करो।
- केवल मुख्य बिंदु लिखो, दोहराव नहीं।
- भाषा आसान हो।

Content:
{text}"#;

pub(crate) const CHAT_SYSTEM_PROMPT: &str = r#"
You are a helpful assistant answering questions about the content of {url}.
Answer accurately using only this content. If asked for a summary, give a clear overview.
If asked for details, give long and thorough explanations. Be friendly and natural.

Language rule:
- If the user writes in English, reply fully in English.
- If the user writes in Hindi or Hinglish, reply in a casual Hindi-English mix and match their tone.
- Use at most two or three emoji per reply and never repeat a previous answer word for word.

Website content:
{text}"#;

pub(crate) const CHAT_ACKNOWLEDGEMENT: &str = "Understood. I will answer using only that content.";
