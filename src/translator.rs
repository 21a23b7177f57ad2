//! Maps provider error text to short, friendly messages.

use crate::error::VeoError;
use crate::messages::{self, Locale};

/// A known failure signature and its canned messages.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRule {
    pub kind: ErrorKind,
    pub needles: &'static [&'static str],
    pub id: &'static str,
    pub en: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    PermissionDenied,
    NotFound,
    RateLimited,
    PolicyViolation,
    ProcessingFailure,
    ProviderInternal,
    ServiceUnavailable,
    MissingAssetLocation,
}

impl ErrorRule {
    pub fn message(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Id => self.id,
            Locale::En => self.en,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.needles.iter().any(|needle| text.contains(needle))
    }
}

/// Checked in order, first match wins.
pub const RULES: &[ErrorRule] = &[
    ErrorRule {
        kind: ErrorKind::BadRequest,
        needles: &["400 Bad Request", "INVALID_ARGUMENT"],
        id: "Prompt Tidak Valid atau Opsi Pilihan Salah. Periksa kembali input Anda.",
        en: "Invalid prompt or wrong option selected. Please check your input.",
    },
    ErrorRule {
        kind: ErrorKind::PermissionDenied,
        needles: &["401 Unauthorized", "403 Forbidden", "PERMISSION_DENIED"],
        id: "API Key Tidak Valid atau Tidak Punya Izin. Jika menggunakan VEO 3, pastikan Anda memiliki akses.",
        en: "Invalid API key or missing permission. If you are using VEO 3, make sure you have access.",
    },
    ErrorRule {
        kind: ErrorKind::NotFound,
        needles: &["404 Not Found"],
        id: "Model tidak ditemukan. Kemungkinan Anda belum memiliki akses ke model preview ini.",
        en: "Model not found. You probably do not have access to this preview model yet.",
    },
    ErrorRule {
        kind: ErrorKind::RateLimited,
        needles: &["429 Too Many Requests"],
        id: "Sabar Bang, Kasih Waktu Istirahat Dulu. Anda terlalu sering membuat permintaan.",
        en: "Easy there, give it a rest. You are sending requests too often.",
    },
    ErrorRule {
        kind: ErrorKind::PolicyViolation,
        needles: &["content policy violation"],
        id: "Prompt Melanggar Kebijakan Bang. Coba gunakan prompt yang berbeda.",
        en: "The prompt violates the content policy. Try a different prompt.",
    },
    ErrorRule {
        kind: ErrorKind::ProcessingFailure,
        needles: &["internal error occurred during video processing"],
        id: "Terjadi Error Dari Pihak Google Yah, Bukan Aplikasi.",
        en: "The error came from Google's side, not from this application.",
    },
    ErrorRule {
        kind: ErrorKind::ProviderInternal,
        needles: &["500 Internal Server Error"],
        id: "Google Lagi Error Bang. Coba lagi nanti.",
        en: "Google is having trouble right now. Try again later.",
    },
    ErrorRule {
        kind: ErrorKind::ServiceUnavailable,
        needles: &["503 Service Unavailable"],
        id: "Layanan Google Lagi Tidur Bang. Coba lagi nanti.",
        en: "The Google service is unavailable. Try again later.",
    },
    ErrorRule {
        kind: ErrorKind::MissingAssetLocation,
        needles: &["no download link was found"],
        id: "Video berhasil dibuat, tetapi tautan unduhan tidak ditemukan. Coba lagi.",
        en: "The video was generated, but no download link was returned. Try again.",
    },
];

/// Returns the first rule whose signature occurs in `text`.
pub fn classify(text: &str) -> Option<&'static ErrorRule> {
    RULES.iter().find(|rule| rule.matches(text))
}

/// Never fails: unknown text is wrapped in a generic template.
pub fn translate(text: &str, locale: Locale) -> String {
    match classify(text) {
        Some(rule) => rule.message(locale).to_string(),
        None => fallback(text, locale),
    }
}

/// Like [`translate`], but a failed download never goes through the provider
/// rules: its status belongs to the file host, not the generation API.
pub fn translate_error(err: &VeoError, locale: Locale) -> String {
    match err {
        VeoError::MissingCredential => messages::missing_credential(locale).to_string(),
        VeoError::AssetFetch { .. } => fallback(&err.to_string(), locale),
        other => translate(&other.to_string(), locale),
    }
}

fn fallback(text: &str, locale: Locale) -> String {
    match locale {
        Locale::Id => format!("Terjadi kesalahan: {}", text),
        Locale::En => format!("An error occurred: {}", text),
    }
}
