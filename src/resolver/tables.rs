use crate::schema::RootCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical display names for the four roots. These are the strings that
/// appear as breakdown keys and as the prefix of compound labels like
/// `可回收物-瓶`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootNames {
    pub recyclable: String,
    pub kitchen: String,
    pub hazardous: String,
    pub other: String,
}

impl Default for RootNames {
    fn default() -> Self {
        Self {
            recyclable: "可回收物".to_string(),
            kitchen: "厨余垃圾".to_string(),
            hazardous: "有害垃圾".to_string(),
            other: "其他垃圾".to_string(),
        }
    }
}

impl RootNames {
    pub fn name_of(&self, root: RootCategory) -> &str {
        match root {
            RootCategory::Recyclable => &self.recyclable,
            RootCategory::Kitchen => &self.kitchen,
            RootCategory::Hazardous => &self.hazardous,
            RootCategory::Other => &self.other,
        }
    }

    /// Reverse lookup against the closed set, ASCII case-insensitive.
    pub fn root_for(&self, candidate: &str) -> Option<RootCategory> {
        let candidate = candidate.trim();
        RootCategory::ALL
            .into_iter()
            .find(|&root| self.name_of(root).eq_ignore_ascii_case(candidate))
    }
}

/// Per-root keyword lists for substring heuristics, English and localized
/// terms mixed. Entries are matched lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordLists {
    pub recyclable: Vec<String>,
    pub kitchen: Vec<String>,
    pub hazardous: Vec<String>,
    pub other: Vec<String>,
}

impl KeywordLists {
    pub fn for_root(&self, root: RootCategory) -> &[String] {
        match root {
            RootCategory::Recyclable => &self.recyclable,
            RootCategory::Kitchen => &self.kitchen,
            RootCategory::Hazardous => &self.hazardous,
            RootCategory::Other => &self.other,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordLists {
    fn default() -> Self {
        Self {
            recyclable: strings(&[
                "plastic", "glass", "metal", "paper", "can", "bottle", "cardboard", "carton",
                "可回收", "瓶", "罐", "纸箱", "塑料", "玻璃", "金属",
            ]),
            kitchen: strings(&[
                "vegetable", "fruit", "peel", "leftover", "bone", "eggshell", "厨余", "果皮",
                "菜叶", "剩饭", "骨头", "蛋壳",
            ]),
            hazardous: strings(&[
                "battery", "medicine", "paint", "lamp", "pesticide", "有害", "电池", "药品",
                "油漆", "灯管",
            ]),
            other: strings(&[
                "tissue", "cigarette", "ceramic", "dust", "diaper", "其他", "纸巾", "烟头",
                "陶瓷", "尘土",
            ]),
        }
    }
}

/// Known misspellings and synonyms, mapped to canonical root names before the
/// closed-set check.
pub fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("可回收".to_string(), "可回收物".to_string()),
        ("其它垃圾".to_string(), "其他垃圾".to_string()),
        ("干垃圾".to_string(), "其他垃圾".to_string()),
        ("湿垃圾".to_string(), "厨余垃圾".to_string()),
        ("厨房垃圾".to_string(), "厨余垃圾".to_string()),
    ])
}

/// Specific class names the model emits that carry no usable prefix or
/// keyword. Keys are matched lowercased against the whole label.
pub fn default_label_map() -> BTreeMap<String, RootCategory> {
    BTreeMap::from([
        ("banana".to_string(), RootCategory::Kitchen),
        ("apple".to_string(), RootCategory::Kitchen),
        ("orange".to_string(), RootCategory::Kitchen),
        ("battery".to_string(), RootCategory::Hazardous),
        ("thermometer".to_string(), RootCategory::Hazardous),
        ("newspaper".to_string(), RootCategory::Recyclable),
        ("cigarette butt".to_string(), RootCategory::Other),
        ("ceramic tile".to_string(), RootCategory::Other),
    ])
}

/// The immutable configuration tables the resolver reads. Loaded once at
/// startup and injected; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    pub roots: RootNames,
    pub aliases: BTreeMap<String, String>,
    pub label_map: BTreeMap<String, RootCategory>,
    pub keywords: KeywordLists,
}

impl Default for RuleTables {
    fn default() -> Self {
        Self {
            roots: RootNames::default(),
            aliases: default_aliases(),
            label_map: default_label_map(),
            keywords: KeywordLists::default(),
        }
    }
}

impl RuleTables {
    /// Lower-case every case-insensitive lookup key once, at load time, so
    /// per-request lookups stay pure and cheap. Externally supplied tables
    /// may arrive in any case.
    pub fn normalize(&mut self) {
        self.label_map = self
            .label_map
            .iter()
            .map(|(k, &v)| (k.trim().to_lowercase(), v))
            .collect();
        for root in RootCategory::ALL {
            let list = match root {
                RootCategory::Recyclable => &mut self.keywords.recyclable,
                RootCategory::Kitchen => &mut self.keywords.kitchen,
                RootCategory::Hazardous => &mut self.keywords.hazardous,
                RootCategory::Other => &mut self.keywords.other,
            };
            for keyword in list.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            list.retain(|k| !k.is_empty());
        }
        self.aliases = self
            .aliases
            .iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
    }

    /// Alias table lookup; unknown input passes through trimmed.
    pub fn apply_alias<'a>(&'a self, candidate: &'a str) -> &'a str {
        let candidate = candidate.trim();
        self.aliases
            .get(candidate)
            .map(String::as_str)
            .unwrap_or(candidate)
    }
}
