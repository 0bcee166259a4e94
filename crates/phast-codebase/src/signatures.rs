//! The bundled builtin signature map.
//!
//! `signatures/builtins.json` names each internal function FQSEN and its
//! parameter and return union types. Overload alternates are encoded as
//! `\name,1`-suffixed keys and become alternate ids in declaration order.
//! The seed also registers the always-available internal classes.

use crate::codebase::CodeBase;
use crate::element::{Class, ElementFlags, Func, Method, Parameter};
use phast_common::Atom;
use phast_types::{ClassFqsen, FunctionFqsen, MethodFqsen, Type, UnionType};
use serde::Deserialize;
use tracing::debug;

const BUILTINS_JSON: &str = include_str!("../signatures/builtins.json");

/// The file internal elements report as their location.
pub const INTERNAL_FILE: &str = "<internal>";

#[derive(Deserialize)]
struct SignatureEntry {
    #[serde(rename = "return", default)]
    return_type: String,
    #[serde(default)]
    params: Vec<ParamEntry>,
}

#[derive(Deserialize)]
struct ParamEntry {
    name: String,
    #[serde(rename = "type", default)]
    type_string: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    variadic: bool,
    #[serde(default)]
    by_ref: bool,
}

/// Seed `codebase` with the bundled signatures and internal classes.
pub fn seed(codebase: &mut CodeBase) {
    seed_functions(codebase);
    seed_classes(codebase);
}

fn seed_functions(codebase: &mut CodeBase) {
    let entries: indexmap_like::Entries =
        serde_json::from_str(BUILTINS_JSON).expect("bundled builtins.json is well-formed");
    let file = Atom::new(INTERNAL_FILE);
    let mut count = 0usize;
    for (key, entry) in entries.0 {
        // Alternate keys carry a `,N` suffix; the registry re-derives the
        // alternate id from insertion order.
        let name = key.split(',').next().unwrap_or(&key);
        let fqsen = FunctionFqsen::from_full_name(name);
        let mut func = Func::new(fqsen, file, 0, ElementFlags::INTERNAL);
        func.union_type = UnionType::from_native_string(&entry.return_type);
        func.parameters = entry
            .params
            .iter()
            .map(|p| {
                let mut parameter = Parameter::new(
                    Atom::new(&p.name),
                    UnionType::from_native_string(&p.type_string),
                    0,
                );
                parameter.is_variadic = p.variadic;
                parameter.is_by_ref = p.by_ref;
                parameter.has_default = p.optional;
                parameter
            })
            .collect();
        func.recount_parameters();
        codebase.add_function(func);
        count += 1;
    }
    debug!(functions = count, "seeded builtin signatures");
}

/// Minimal declarations for the classes the engine itself reasons about.
fn seed_classes(codebase: &mut CodeBase) {
    let file = Atom::new(INTERNAL_FILE);

    let mut add = |name: &str, flags: ElementFlags| -> ClassFqsen {
        codebase.add_class(Class::new(
            ClassFqsen::from_full_name(name),
            file,
            0,
            flags | ElementFlags::INTERNAL,
        ))
    };

    add("\\stdClass", ElementFlags::empty());
    add("\\Closure", ElementFlags::FINAL);
    let traversable = add("\\Traversable", ElementFlags::INTERFACE);
    let iterator = add("\\Iterator", ElementFlags::INTERFACE);
    let aggregate = add("\\IteratorAggregate", ElementFlags::INTERFACE);
    add("\\ArrayAccess", ElementFlags::INTERFACE);
    add("\\Countable", ElementFlags::INTERFACE);
    let generator = add("\\Generator", ElementFlags::FINAL);
    let throwable = add("\\Throwable", ElementFlags::INTERFACE);
    let exception = add("\\Exception", ElementFlags::empty());
    let error = add("\\Error", ElementFlags::empty());

    if let Ok(class) = codebase.get_class_by_fqsen_mut(iterator) {
        class.interfaces = vec![traversable];
    }
    if let Ok(class) = codebase.get_class_by_fqsen_mut(aggregate) {
        class.interfaces = vec![traversable];
    }
    if let Ok(class) = codebase.get_class_by_fqsen_mut(generator) {
        class.interfaces = vec![iterator];
    }
    if let Ok(class) = codebase.get_class_by_fqsen_mut(exception) {
        class.interfaces = vec![throwable];
    }
    if let Ok(class) = codebase.get_class_by_fqsen_mut(error) {
        class.interfaces = vec![throwable];
    }

    // The Throwable surface, on the interface so subclasses inherit it.
    let string_type = UnionType::of(Type::STRING);
    let int_type = UnionType::of(Type::INT);
    for (name, return_type) in [
        ("getMessage", string_type.clone()),
        ("getCode", int_type.clone()),
        ("getFile", string_type.clone()),
        ("getLine", int_type),
        ("getTraceAsString", string_type),
    ] {
        let mut method = Method::new(
            MethodFqsen::new(throwable, Atom::new(name)),
            file,
            0,
            ElementFlags::INTERNAL | ElementFlags::PUBLIC,
        );
        method.union_type = return_type;
        codebase.add_method(method);
    }
    let mut previous = Method::new(
        MethodFqsen::new(throwable, Atom::new("getPrevious")),
        file,
        0,
        ElementFlags::INTERNAL | ElementFlags::PUBLIC,
    );
    previous.union_type = UnionType::from_types([
        Type::class(throwable),
        Type::NULL,
    ]);
    codebase.add_method(previous);
}

/// Deserialization shim keeping the JSON's key order, so alternates get
/// ascending ids.
mod indexmap_like {
    use super::SignatureEntry;
    use serde::Deserialize;

    pub struct Entries(pub Vec<(String, SignatureEntry)>);

    impl<'de> Deserialize<'de> for Entries {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            struct Visitor;
            impl<'de> serde::de::Visitor<'de> for Visitor {
                type Value = Entries;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str("a map of signatures")
                }

                fn visit_map<A>(self, mut map: A) -> Result<Entries, A::Error>
                where
                    A: serde::de::MapAccess<'de>,
                {
                    let mut entries = Vec::new();
                    while let Some((key, value)) = map.next_entry::<String, SignatureEntry>()? {
                        entries.push((key, value));
                    }
                    Ok(Entries(entries))
                }
            }
            deserializer.deserialize_map(Visitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phast_types::NativeType;

    #[test]
    fn seeded_codebase_knows_builtins() {
        let codebase = CodeBase::new();
        let strlen = codebase
            .get_function_by_fqsen(FunctionFqsen::from_full_name("\\strlen"))
            .unwrap();
        assert!(strlen.is_internal());
        assert_eq!(strlen.union_type, UnionType::of(Type::INT));
        assert_eq!(strlen.required_param_count, 1);
    }

    #[test]
    fn alternates_load_in_order() {
        let codebase = CodeBase::new();
        let alternates =
            codebase.get_function_alternates(FunctionFqsen::from_full_name("\\implode"));
        assert_eq!(alternates.len(), 2);
        assert_eq!(alternates[0].parameters.len(), 2);
        assert_eq!(alternates[1].parameters.len(), 1);
    }

    #[test]
    fn by_ref_and_variadic_survive() {
        let codebase = CodeBase::new();
        let sort = codebase
            .get_function_by_fqsen(FunctionFqsen::from_full_name("\\sort"))
            .unwrap();
        assert!(sort.parameters[0].is_by_ref);
        let sprintf = codebase
            .get_function_by_fqsen(FunctionFqsen::from_full_name("\\sprintf"))
            .unwrap();
        assert!(sprintf.parameters[1].is_variadic);
    }

    #[test]
    fn internal_classes_exist() {
        let codebase = CodeBase::new();
        for name in ["\\stdClass", "\\Generator", "\\Closure", "\\Exception"] {
            assert!(
                codebase.has_class_with_fqsen(ClassFqsen::from_full_name(name)),
                "missing {name}"
            );
        }
        let exception = codebase
            .get_class_by_fqsen(ClassFqsen::from_full_name("\\Exception"))
            .unwrap();
        assert_eq!(exception.interfaces.len(), 1);
    }

    #[test]
    fn native_unions_parse_arrays() {
        let codebase = CodeBase::new();
        let preg_split = codebase
            .get_function_by_fqsen(FunctionFqsen::from_full_name("\\preg_split"))
            .unwrap();
        assert!(preg_split.union_type.has_native(NativeType::Bool));
        assert!(preg_split
            .union_type
            .has_type(&Type::generic_array_of(Type::STRING)));
    }
}
