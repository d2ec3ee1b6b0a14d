use quiz_core::model::{Difficulty, Rating, Topic, TopicId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicCardVm {
    pub id: TopicId,
    pub name: String,
    pub description: String,
    pub glyph: &'static str,
    pub icon_class: &'static str,
}

impl From<&Topic> for TopicCardVm {
    fn from(topic: &Topic) -> Self {
        let icon = topic.resolved_icon();
        Self {
            id: topic.id.clone(),
            name: topic.name.clone(),
            description: topic.description.clone(),
            glyph: icon.glyph(),
            icon_class: icon.css_class(),
        }
    }
}

#[must_use]
pub fn map_topic_cards(topics: &[Topic]) -> Vec<TopicCardVm> {
    topics.iter().map(TopicCardVm::from).collect()
}

/// One choice on the self-rating screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingOptionVm {
    pub rating: Rating,
    pub label: &'static str,
    pub difficulty: Difficulty,
}

const RATING_LABELS: [&str; 5] = [
    "Just starting",
    "Know the basics",
    "Comfortable",
    "Confident",
    "Expert",
];

#[must_use]
pub fn rating_options() -> Vec<RatingOptionVm> {
    (1u8..=5)
        .filter_map(|value| Rating::new(value).ok())
        .map(|rating| RatingOptionVm {
            rating,
            label: RATING_LABELS[usize::from(rating.value() - 1)],
            difficulty: rating.difficulty(),
        })
        .collect()
}
