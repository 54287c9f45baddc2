//! Finding code: signature matching, preconditions and search recipes.

pub mod find_methods;
pub mod method_matcher;
pub mod preconditions;
pub mod uses_method;

pub use find_methods::FindMethods;
pub use method_matcher::{FallbackPolicy, MethodMatcher, PatternComponents};
pub use preconditions::{Precondition, Preconditions};
pub use uses_method::UsesMethod;
