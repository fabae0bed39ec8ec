//! Concrete stack definitions.

mod gen_ai_bedrock;

pub use gen_ai_bedrock::{
    AUDIO_FUNCTION, INPUT_SUMMARISE_PREFIX, OUTPUT_AUDIO_PREFIX, OUTPUT_SUMMARY_PREFIX,
    REPLY_FUNCTION, SUMMARISE_FUNCTION, gen_ai_bedrock_stack,
};
