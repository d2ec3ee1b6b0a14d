use serde::{Deserialize, Serialize};

use crate::model::ids::TopicId;

/// A subject area containing quiz questions. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
}

impl Topic {
    #[must_use]
    pub fn new(id: TopicId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            icon: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Resolved icon, falling back to the default for unknown references.
    #[must_use]
    pub fn resolved_icon(&self) -> TopicIcon {
        self.icon
            .as_deref()
            .map_or(TopicIcon::Default, TopicIcon::from_ref)
    }
}

/// Known icon references a topic may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TopicIcon {
    Percentage,
    Calculator,
    Clock,
    Chart,
    Shapes,
    Train,
    Coins,
    Scale,
    #[default]
    Default,
}

impl TopicIcon {
    /// Map an icon reference string to a known icon.
    ///
    /// Accepts both plain names (`percentage`) and the component-style names the
    /// API sends (`FaPercentage`). Unknown names map to `TopicIcon::Default`.
    #[must_use]
    pub fn from_ref(raw: &str) -> Self {
        let name = raw.trim();
        let name = name
            .strip_prefix("Fa")
            .or_else(|| name.strip_prefix("Md"))
            .unwrap_or(name)
            .to_ascii_lowercase();

        match name.as_str() {
            "percentage" | "percent" => Self::Percentage,
            "calculator" => Self::Calculator,
            "clock" | "time" => Self::Clock,
            "chart" | "chartline" | "chartbar" => Self::Chart,
            "shapes" | "geometry" => Self::Shapes,
            "train" | "speed" => Self::Train,
            "coins" | "money" | "interest" => Self::Coins,
            "scale" | "balancescale" | "ratio" => Self::Scale,
            _ => Self::Default,
        }
    }

    /// Terminal-friendly glyph for the icon.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            TopicIcon::Percentage => "%",
            TopicIcon::Calculator => "🧮",
            TopicIcon::Clock => "⏱",
            TopicIcon::Chart => "📈",
            TopicIcon::Shapes => "△",
            TopicIcon::Train => "🚆",
            TopicIcon::Coins => "🪙",
            TopicIcon::Scale => "⚖",
            TopicIcon::Default => "📘",
        }
    }

    /// Stable CSS class for HTML rendering.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            TopicIcon::Percentage => "icon-percentage",
            TopicIcon::Calculator => "icon-calculator",
            TopicIcon::Clock => "icon-clock",
            TopicIcon::Chart => "icon-chart",
            TopicIcon::Shapes => "icon-shapes",
            TopicIcon::Train => "icon-train",
            TopicIcon::Coins => "icon-coins",
            TopicIcon::Scale => "icon-scale",
            TopicIcon::Default => "icon-default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_lookup_accepts_component_names() {
        assert_eq!(TopicIcon::from_ref("FaPercentage"), TopicIcon::Percentage);
        assert_eq!(TopicIcon::from_ref("train"), TopicIcon::Train);
        assert_eq!(TopicIcon::from_ref("MdBalanceScale"), TopicIcon::Scale);
    }

    #[test]
    fn unknown_or_missing_icon_falls_back_to_default() {
        let topic = Topic::new(TopicId::new("ratios").unwrap(), "Ratios", "");
        assert_eq!(topic.resolved_icon(), TopicIcon::Default);

        let topic = topic.with_icon("FaUnicorn");
        assert_eq!(topic.resolved_icon(), TopicIcon::Default);
    }
}
