#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dupgate::DupgateConfig;

/// Prose about smart plugs, long enough to clear a 50-word floor.
pub const PLUG_WORDS: &str = "smart plugs sit between the wall socket and an appliance \
    and let you switch lamps fans heaters and coffee makers from a phone app or a voice \
    assistant while most models also report how much energy each device draws so you can \
    spot the standby hogs that quietly inflate the monthly bill and schedules make it easy \
    to turn the porch light on at dusk and off at midnight without touching anything at all \
    and away modes randomize lamps to make an empty house look occupied during a long trip";

/// Unrelated prose of similar length.
pub const BREAD_WORDS: &str = "sourdough bread depends on a lively starter fed with flour \
    and water for several days before the first bake and the dough needs long patient \
    proofing in a cool kitchen so the wild yeast can build flavor while a heavy cast iron pot \
    traps steam in the oven which lets the loaf spring up before the crust sets and turns deep \
    brown and crackly once it cools on a rack the crumb should be open glossy and slightly \
    tangy and it keeps for days wrapped in a linen towel on the counter";

/// `PLUG_WORDS` with `edits` words swapped out, starting from the end.
pub fn edited_plug_words(edits: usize) -> String {
    let mut words: Vec<String> = PLUG_WORDS.split_whitespace().map(str::to_string).collect();
    let len = words.len();
    for (n, word) in words.iter_mut().rev().take(edits).enumerate() {
        *word = format!("revision{n}");
    }
    assert!(edits < len);
    words.join(" ")
}

/// Markdown with a front-matter title and date.
pub fn article(title: &str, date: &str, body: &str) -> String {
    format!("---\ntitle: {title}\ndate: {date}\n---\n# {title}\n\n{body}\n")
}

pub fn write_article(dir: &Path, name: &str, title: &str, date: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, article(title, date, body)).expect("write article");
    path
}

/// Defaults with a word floor the fixtures clear.
pub fn test_config() -> DupgateConfig {
    let mut cfg = DupgateConfig::default();
    cfg.detection = cfg.detection.with_min_content_length(50);
    cfg
}

/// Scenario A: days 0, 2 and 95, the first two 95% identical.
pub fn scenario_a(dir: &Path) {
    write_article(dir, "day-000.md", "Smart Plug Guide", "2024-01-01", PLUG_WORDS);
    write_article(
        dir,
        "day-002.md",
        "Smart Plug Guide",
        "2024-01-03",
        &edited_plug_words(5),
    );
    write_article(dir, "day-095.md", "Smart Plug Guide", "2024-04-05", PLUG_WORDS);
}
