use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_COLOR: &str = "#6366f1";

/// One `name → color` association; `name` is matched as a case-insensitive
/// substring of the event title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRule {
    pub name: String,
    pub color: String,
}

impl ColorRule {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("john", "#10b981"),
            Self::new("sarah", "#f59e0b"),
            Self::new("mike", "#ef4444"),
            Self::new("emily", "#8b5cf6"),
            Self::new("david", "#06b6d4"),
        ]
    }
}

/// Ordered color table. The first rule whose name occurs in the title wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    rules: Vec<(String, String)>,
    default_color: String,
}

impl Palette {
    pub fn new(rules: Vec<ColorRule>, default_color: impl Into<String>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .filter(|rule| !rule.name.is_empty())
                .map(|rule| (rule.name.to_lowercase(), rule.color))
                .collect(),
            default_color: default_color.into(),
        }
    }

    pub fn color_for(&self, title: Option<&str>) -> &str {
        let Some(title) = title else {
            return &self.default_color;
        };

        let title = title.to_lowercase();
        self.rules
            .iter()
            .find(|(name, _)| title.contains(name.as_str()))
            .map(|(_, color)| color.as_str())
            .unwrap_or(&self.default_color)
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(ColorRule::defaults(), DEFAULT_EVENT_COLOR)
    }
}
