pub mod openai;
pub mod vocabulary;

pub use openai::OpenAiInference;
