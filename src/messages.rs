//! User-facing text. Indonesian is the default locale, English is available
//! for terminals where it reads better.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Id,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Id => "id",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" | "indonesian" => Ok(Locale::Id),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

const LOADING_ID: [&str; 7] = [
    "Memanaskan kursi sutradara digital...",
    "Merakit piksel menjadi sebuah mahakarya...",
    "Mengajari algoritma seni sinema...",
    "Menghasilkan simfoni visual untuk Anda...",
    "Mewujudkan imajinasi Anda menjadi kenyataan...",
    "Ini adalah proses yang rumit, terima kasih atas kesabaran Anda...",
    "Menyelesaikan adegan, hampir selesai...",
];

const LOADING_EN: [&str; 7] = [
    "Warming up the digital director's chair...",
    "Assembling pixels into a masterpiece...",
    "Teaching the algorithm the art of cinema...",
    "Composing a visual symphony for you...",
    "Turning your imagination into reality...",
    "This is an involved process, thanks for your patience...",
    "Wrapping up the scene, almost done...",
];

/// Rotating message shown while an operation is being polled.
pub fn loading_message(locale: Locale, attempt: u32) -> &'static str {
    let messages = match locale {
        Locale::Id => &LOADING_ID,
        Locale::En => &LOADING_EN,
    };
    messages[attempt as usize % messages.len()]
}

pub fn missing_credential(locale: Locale) -> &'static str {
    match locale {
        Locale::Id => "Harap simpan Kunci API Anda sebelum membuat video.",
        Locale::En => "Please save your API key before generating a video.",
    }
}

/// First `n` characters of a prompt, for status lines.
pub fn excerpt(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn progress_prefix(position: usize, total: usize) -> String {
    format!("[{}/{}]", position, total)
}

pub fn batch_processing(locale: Locale, position: usize, total: usize, prompt: &str) -> String {
    let prefix = progress_prefix(position, total);
    let short = excerpt(prompt, 30);
    match locale {
        Locale::Id => format!("{} Memproses prompt: \"{}...\"", prefix, short),
        Locale::En => format!("{} Processing prompt: \"{}...\"", prefix, short),
    }
}

pub fn batch_encoding_image(locale: Locale, position: usize, total: usize, name: &str) -> String {
    let prefix = progress_prefix(position, total);
    match locale {
        Locale::Id => format!("{} Mengonversi gambar: {}...", prefix, name),
        Locale::En => format!("{} Encoding image: {}...", prefix, name),
    }
}

pub fn batch_generating(locale: Locale, position: usize, total: usize) -> String {
    let prefix = progress_prefix(position, total);
    match locale {
        Locale::Id => format!(
            "{} Menghasilkan video... Ini mungkin memakan waktu beberapa menit.",
            prefix
        ),
        Locale::En => format!(
            "{} Generating video... This may take a few minutes.",
            prefix
        ),
    }
}

pub fn batch_downloading(locale: Locale, position: usize, total: usize) -> String {
    let prefix = progress_prefix(position, total);
    match locale {
        Locale::Id => format!("{} Video dibuat! Mengunduh...", prefix),
        Locale::En => format!("{} Video created! Downloading...", prefix),
    }
}

pub fn batch_item_failed(locale: Locale, position: usize, total: usize, message: &str) -> String {
    let prefix = progress_prefix(position, total);
    match locale {
        Locale::Id => format!("{} Error: {}. Melewati.", prefix, message),
        Locale::En => format!("{} Error: {}. Skipping.", prefix, message),
    }
}

pub fn batch_item_error(locale: Locale, position: usize, prompt: &str, message: &str) -> String {
    let short = excerpt(prompt, 20);
    match locale {
        Locale::Id => format!(
            "Error pada video {} (\"{}...\"): {}",
            position, short, message
        ),
        Locale::En => format!(
            "Error on video {} (\"{}...\"): {}",
            position, short, message
        ),
    }
}

pub fn batch_waiting(locale: Locale, position: usize, total: usize, delay_secs: u64) -> String {
    let prefix = progress_prefix(position, total);
    match locale {
        Locale::Id => format!(
            "{} Unduhan selesai. Menunggu {} detik sebelum video berikutnya...",
            prefix, delay_secs
        ),
        Locale::En => format!(
            "{} Download finished. Waiting {} seconds before the next video...",
            prefix, delay_secs
        ),
    }
}

pub fn batch_finished(locale: Locale) -> &'static str {
    match locale {
        Locale::Id => "Pemrosesan batch selesai!",
        Locale::En => "Batch processing finished!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_messages_rotate() {
        assert_eq!(
            loading_message(Locale::Id, 0),
            loading_message(Locale::Id, 7)
        );
        assert_ne!(
            loading_message(Locale::En, 0),
            loading_message(Locale::En, 1)
        );
    }

    #[test]
    fn locale_parses_loosely() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("id-ID".parse::<Locale>(), Ok(Locale::Id));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn processing_line_truncates_prompt() {
        let line = batch_processing(
            Locale::En,
            2,
            3,
            "a very long prompt that keeps going past thirty characters",
        );
        assert_eq!(
            line,
            "[2/3] Processing prompt: \"a very long prompt that keeps ...\""
        );
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
    }
}
