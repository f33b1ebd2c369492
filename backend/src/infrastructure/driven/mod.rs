pub mod heygen;
pub mod openai;

pub use heygen::HeygenClient;
pub use openai::OpenAiCompletion;
