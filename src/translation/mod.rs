/*!
 * Translation engines.
 *
 * - `core`: the `TranslationEngine` contract and the Ollama-backed service
 * - `cache`: in-memory caching of translations
 * - `mock`: a scriptable engine for tests and benchmarks
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::core::{TranslationEngine, TranslationService};
pub use self::mock::{MockBehavior, MockEngine};

// Submodules
pub mod cache;
pub mod core;
pub mod mock;
