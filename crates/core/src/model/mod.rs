mod ids;
mod question;
mod result;
mod topic;

pub use ids::{ParseIdError, QuestionId, TopicId};
pub use question::{Difficulty, Question, QuestionError, Rating};
pub use result::{ResultDetail, ResultError, ResultRecord};
pub use topic::{Topic, TopicIcon};
