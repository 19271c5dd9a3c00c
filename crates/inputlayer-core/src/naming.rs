//! Identifier case conversion between Rust type names, relation names,
//! and Datalog variables.

/// Converts a PascalCase type name to a snake_case relation name.
///
/// Acronym runs keep their grouping: `HTTPRequest` becomes `http_request`,
/// not `h_t_t_p_request`.
///
/// # Examples
///
/// ```
/// use inputlayer_core::naming::type_to_relation;
///
/// assert_eq!(type_to_relation("Employee"), "employee");
/// assert_eq!(type_to_relation("UserProfile"), "user_profile");
/// assert_eq!(type_to_relation("HTTPRequest"), "http_request");
/// ```
#[must_use]
pub fn type_to_relation(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // Boundary between an uppercase run and a capitalized word
            // (ABCDef -> abc_def), or between lower/digit and upper.
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() {
                out.push('_');
            } else if prev.is_ascii_uppercase() && next_lower {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}

/// Converts a snake_case name to PascalCase.
///
/// Each underscore-separated part is capitalized: first letter uppercased,
/// the rest lowercased.
#[must_use]
pub fn snake_to_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            for c in chars {
                out.push(c.to_ascii_lowercase());
            }
        }
    }
    out
}

/// Converts a snake_case column name to its Datalog variable form.
///
/// `department_name` becomes `DepartmentName`; a single letter is simply
/// uppercased.
#[must_use]
pub fn column_to_variable(column_name: &str) -> String {
    snake_to_pascal(column_name)
}
