pub mod message_builder;
pub mod record_type_map;
pub mod response_parser;

pub use message_builder::MessageBuilder;
pub use record_type_map::QuestionMapper;
pub use response_parser::ResponseParser;
