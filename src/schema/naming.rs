//! Name inference shared by every resolver.

/// Convert an upper camel case type name to upper underscore notation.
///
/// An underscore is inserted before every uppercase letter except the first
/// character, then the whole name is upper-cased: `FooBar` becomes `FOO_BAR`.
pub fn infer_name(type_name: &str) -> String {
    let mut inferred = String::with_capacity(type_name.len() + 4);
    for (i, c) in type_name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            inferred.push('_');
        }
        inferred.extend(c.to_uppercase());
    }
    inferred
}
