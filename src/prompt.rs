//! Assemble the optimized prompt document.
//!
//! The assembler is a pure function of the form inputs: no clock, no I/O,
//! and the same inputs always produce the same bytes.

use std::fmt;
use std::io;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Fixed body of the `DELIVERABLE FORMAT` section.
const DELIVERABLE_FORMAT: &str = include_str!("deliverable.md");

/// Closing bullet of the `REQUIREMENTS` section, always present.
const CLOSING_REQUIREMENT: &str =
    "- Output must be specific, unambiguous, and formatted for easy copy-paste.";

/// The assistant the optimized prompt will be pasted into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum TargetAi {
    #[default]
    #[serde(rename = "ChatGPT")]
    #[value(name = "chatgpt")]
    ChatGpt,
    Claude,
    Gemini,
    Other,
}

impl TargetAi {
    /// Every target, in selector order.
    pub const ALL: [TargetAi; 4] = [
        TargetAi::ChatGpt,
        TargetAi::Claude,
        TargetAi::Gemini,
        TargetAi::Other,
    ];

    /// Name as shown in the form and written to the session log.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetAi::ChatGpt => "ChatGPT",
            TargetAi::Claude => "Claude",
            TargetAi::Gemini => "Gemini",
            TargetAi::Other => "Other",
        }
    }
}

impl fmt::Display for TargetAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Prompt style: whether clarifying answers are collected and emitted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Detail,
    Basic,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Detail, Mode::Basic];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Detail => "DETAIL",
            Mode::Basic => "BASIC",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Clarifying answers keyed by slot id (`A1`, `A2`, ...), in slot order.
///
/// Blank answers are never stored; a slot left empty is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    entries: Vec<(String, String)>,
}

impl Answers {
    /// Build the mapping from raw answer inputs, numbering slots from `A1`.
    ///
    /// Whitespace-only inputs are dropped; kept values are stored verbatim.
    pub fn from_inputs<S: AsRef<str>>(inputs: &[S]) -> Self {
        let entries = inputs
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.as_ref().trim().is_empty())
            .map(|(i, value)| (format!("A{}", i + 1), value.as_ref().to_string()))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(slot, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as a JSON object in slot order, as stored in the session log.
    ///
    /// The layout is `{"A1": "x", "A2": "y"}` with every character outside
    /// printable ASCII written as a `\uXXXX` escape. That is the layout of
    /// Python's `json.dumps`, which existing session logs were written with.
    pub fn to_json(&self) -> String {
        let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), LogJson);
        if self.serialize(&mut serializer).is_err() {
            return "{}".to_string();
        }
        String::from_utf8(serializer.into_inner()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// JSON layout of the `answers_json` log column.
struct LogJson;

impl serde_json::ser::Formatter for LogJson {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Fragments never hold quotes, backslashes or control characters.
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for Answers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (slot, value) in &self.entries {
            map.serialize_entry(slot, value)?;
        }
        map.end()
    }
}

/// Assemble the optimized prompt document.
///
/// Returns the empty string when `rough_idea` is blank; callers treat that
/// as "no output yet". `answers` is expected to be filtered already.
#[must_use]
pub fn build_prompt(
    rough_idea: &str,
    target_ai: TargetAi,
    mode: Mode,
    answers: &Answers,
    max_length: &str,
    extra_instructions: &str,
) -> String {
    let rough_idea = rough_idea.trim();
    if rough_idea.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = vec![
        format!("You are Lyra, optimizing a user request for {target_ai}."),
        "Follow the 4-D method: Deconstruct, Diagnose, Develop, Deliver.".to_string(),
        "Return a final, ready-to-run prompt for the target AI.".to_string(),
        String::new(),
        "=== INPUT ===".to_string(),
        rough_idea.to_string(),
        String::new(),
    ];

    if mode == Mode::Detail && !answers.is_empty() {
        lines.push("=== USER ANSWERS ===".to_string());
        lines.extend(
            answers
                .iter()
                .map(|(slot, value)| format!("- {slot}: {value}")),
        );
        lines.push(String::new());
    }

    lines.push("=== REQUIREMENTS ===".to_string());
    let max_length = max_length.trim();
    if !max_length.is_empty() {
        lines.push(format!("- Max length/tokens: {max_length}"));
    }
    let extra_instructions = extra_instructions.trim();
    if !extra_instructions.is_empty() {
        lines.push(format!("- Special constraints: {extra_instructions}"));
    }
    lines.push(CLOSING_REQUIREMENT.to_string());
    lines.push(String::new());

    lines.push("=== DELIVERABLE FORMAT ===".to_string());
    lines.extend(DELIVERABLE_FORMAT.trim_end().lines().map(str::to_string));

    lines.join("\n")
}
