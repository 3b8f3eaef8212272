/// Core object model.
///
/// Defines the heap object variants, the type descriptors, and the
/// generic object operations (boolean conversion, element access and
/// assignment, index checking) that dispatch on the receiver's type.
pub mod core;
