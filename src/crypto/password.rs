//! Password strength scoring and random password/passphrase generation.

use std::fmt;

use crate::error::{Result, UiError};

pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const MIN_GENERATED_LENGTH: usize = 8;
pub const DEFAULT_GENERATED_LENGTH: usize = 16;
pub const DEFAULT_WORD_COUNT: usize = 4;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const WORDS: [&str; 30] = [
    "apple", "banana", "cherry", "dragon", "elephant", "forest", "guitar", "horizon", "island", "jungle",
    "kitchen", "lemon", "mountain", "nebula", "ocean", "penguin", "quantum", "rainbow", "sunset", "thunder",
    "umbrella", "volcano", "waterfall", "xenon", "yellow", "zebra", "adventure", "butterfly", "cascade", "diamond",
];
const SEPARATORS: [&str; 4] = ["-", "_", ".", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl Strength {
    fn from_score(score: u8) -> Self {
        match score {
            6.. => Strength::VeryStrong,
            4..=5 => Strength::Strong,
            2..=3 => Strength::Medium,
            _ => Strength::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
            Strength::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    /// 0 to 6: up to two points for length, one per character class.
    pub score: u8,
    pub strength: Strength,
    pub feedback: Vec<&'static str>,
}

pub fn check_strength(password: &str) -> PasswordCheck {
    if password.is_empty() {
        return PasswordCheck {
            score: 0,
            strength: Strength::Weak,
            feedback: vec!["Password is required"],
        };
    }

    let mut score = 0;
    let mut feedback = Vec::new();
    let len = password.chars().count();
    if len >= 12 {
        score += 2;
    } else if len >= 8 {
        score += 1;
    } else {
        feedback.push("Use at least 8 characters");
    }

    let classes: [(fn(char) -> bool, &'static str); 4] = [
        (char::is_lowercase, "Include lowercase letters"),
        (char::is_uppercase, "Include uppercase letters"),
        (|c| c.is_ascii_digit(), "Include numbers"),
        (|c| SPECIAL_CHARS.contains(c), "Include special characters"),
    ];
    for (matches, hint) in classes {
        if password.chars().any(matches) {
            score += 1;
        } else {
            feedback.push(hint);
        }
    }

    if feedback.is_empty() {
        feedback.push("Password looks good!");
    }
    PasswordCheck {
        score,
        strength: Strength::from_score(score),
        feedback,
    }
}

/// Uniform in `0..bound` from the OS generator. `bound` must be non-zero.
fn random_below(bound: usize) -> Result<usize> {
    let bound = bound as u64;
    // rejecting the tail keeps every residue equally likely
    let limit = u64::MAX - u64::MAX % bound;
    loop {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf).map_err(|e| UiError::Random(e.to_string()))?;
        let value = u64::from_le_bytes(buf);
        if value < limit {
            return Ok((value % bound) as usize);
        }
    }
}

fn pick<T: Copy>(items: &[T]) -> Result<T> {
    Ok(items[random_below(items.len())?])
}

/// At least one lowercase, uppercase, digit and special character, shuffled.
/// Lengths under 8 are raised to 8.
pub fn generate_password(length: usize) -> Result<String> {
    let length = length.max(MIN_GENERATED_LENGTH);
    let special = SPECIAL_CHARS.as_bytes();
    let all: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, special].concat();

    let mut chars = Vec::with_capacity(length);
    for set in [LOWERCASE, UPPERCASE, DIGITS, special] {
        chars.push(pick(set)?);
    }
    while chars.len() < length {
        chars.push(pick(&all)?);
    }
    for i in (1..chars.len()).rev() {
        let j = random_below(i + 1)?;
        chars.swap(i, j);
    }
    Ok(chars.into_iter().map(char::from).collect())
}

/// Random words, each capitalized on a coin flip, joined by one random
/// separator and followed by a number from `00` to `999`.
pub fn generate_passphrase(word_count: usize) -> Result<String> {
    let mut words = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        let word = pick(&WORDS)?;
        if random_below(2)? == 1 {
            let (first, rest) = word.split_at(1);
            words.push(format!("{}{rest}", first.to_uppercase()));
        } else {
            words.push(word.to_string());
        }
    }
    let separator = pick(&SEPARATORS)?;
    let number = random_below(1000)?;
    Ok(format!("{}{number:02}", words.join(separator)))
}
