/// Arena allocator.
///
/// This module provides a bump-pointer allocator backed by a list of
/// chunks. The parser allocates every AST node through it, so a whole
/// parse is freed as one unit when the arena is dropped. All pointers
/// it hands out are 16-byte aligned, and usage counters are available
/// for logging and tests.
pub mod arena;
