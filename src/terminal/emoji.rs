//! Emoji constants used by `worker-secrets`.

#![allow(missing_docs)]

use console::Emoji;

pub static EYES: Emoji = Emoji("👀 ", "");
pub static INFO: Emoji = Emoji("💁 ", "");
pub static SLEUTH: Emoji = Emoji("🕵️ ", "");
pub static SPARKLES: Emoji = Emoji("✨ ", "");
pub static SWIRL: Emoji = Emoji("🌀 ", "");
pub static WARN: Emoji = Emoji("⚠️ ", "");
