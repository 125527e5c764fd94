//! Local fallback persistence for scores
//!
//! When no identity is present (or the backend is unreachable) the high
//! score and a small top-10 board live in LocalStorage under fixed keys.

use serde::{Deserialize, Serialize};

/// Maximum number of local board entries to keep
pub const MAX_BOARD_ENTRIES: usize = 10;

/// LocalStorage keys (used only in wasm32)
#[allow(dead_code)]
const HIGH_KEY: &str = "skydash_high";
#[allow(dead_code)]
const BOARD_KEY: &str = "skydash_local_board";

/// A single local board entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    /// Round score
    pub score: u32,
    /// Difficulty name the round was played on
    pub difficulty: String,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Local top-10 score board
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalBoard {
    pub entries: Vec<BoardEntry>,
}

impl LocalBoard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the board
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_BOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score to the board (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u32, difficulty: &str, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = BoardEntry {
            score,
            difficulty: difficulty.to_string(),
            timestamp,
        };

        // Insertion point, sorted descending by score
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_BOARD_ENTRIES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the board from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(BOARD_KEY) {
                if let Ok(board) = serde_json::from_str::<LocalBoard>(&json) {
                    log::info!("Loaded {} local board entries", board.entries.len());
                    return board;
                }
            }
        }

        log::info!("No local board found, starting fresh");
        Self::new()
    }

    /// Save the board to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(BOARD_KEY, &json);
                log::info!("Local board saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Load the single best score (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_high_score() -> u32 {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .and_then(|s| s.get_item(HIGH_KEY).ok())
        .flatten()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Save the single best score (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn save_high_score(score: u32) {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    if let Some(storage) = storage {
        let _ = storage.set_item(HIGH_KEY, &score.to_string());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_high_score() -> u32 {
    0
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_high_score(_score: u32) {
    // No-op for native
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    let diff_ms = now - timestamp;
    let diff_secs = diff_ms / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
            format!(
                "{}/{}/{}",
                date.get_month() + 1,
                date.get_date(),
                date.get_full_year() % 100
            )
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}
