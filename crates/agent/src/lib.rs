//! The conversational core of Confab.
//!
//! One flow, four steps:
//!
//! 1. **Receive** the user's raw text
//! 2. **Render** it through the prompt template (with the tool catalog)
//! 3. **Replay** the recent memory window and call the model
//! 4. **Record** the exchange — user query and model reply, as one pair
//!
//! The orchestrator owns the memory and serializes every mutation; the
//! remote call itself always runs with the lock released.

pub mod memory;
pub mod orchestrator;
pub mod template;

pub use memory::WindowMemory;
pub use orchestrator::{ChatOrchestrator, DEFAULT_SYSTEM_PROMPT};
pub use template::PromptTemplate;
