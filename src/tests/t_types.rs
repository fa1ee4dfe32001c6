use super::*;
use crate::tast::{Dim, Field, Module, StructDef, Ttype};
use crate::tir::TirTypeKind;

fn struct_def(name: &str, parent: Option<&str>, fields: &[(&str, Ttype)]) -> StructDef {
    StructDef {
        name: name.to_string(),
        parent: parent.map(|p| p.to_string()),
        fields: fields
            .iter()
            .map(|(name, ty)| Field {
                name: name.to_string(),
                ty: ty.clone(),
            })
            .collect(),
        bindings: Vec::new(),
        bind_c: false,
    }
}

fn animal_module() -> Module {
    let mut module = Module::new("zoo");
    module.structs.push(struct_def(
        "animal",
        None,
        &[("age", Ttype::int(4))],
    ));
    module.structs.push(struct_def(
        "dog",
        Some("animal"),
        &[("tail", Ttype::int(4))],
    ));
    module.structs.push(struct_def(
        "cat",
        Some("animal"),
        &[("lives", Ttype::int(4))],
    ));
    module
}

#[test]
fn test_lower_type_caches_by_structural_key() {
    let mut types = TypeLowerer::new();
    let a = types.lower_type(&Ttype::int(8));
    let b = types.lower_type(&Ttype::int(8));
    assert_eq!(a, b);

    let arr = Ttype::fixed_array(Ttype::real(8), &[3]);
    let c = types.lower_type(&arr);
    let d = types.lower_type(&arr);
    assert_eq!(c, d);
    assert_ne!(a, c);
}

#[test]
fn test_complex_lowers_to_component_pair() {
    let mut types = TypeLowerer::new();
    let id = types.lower_type(&Ttype::complex(8));
    assert_eq!(types.cache.get(id).name.as_deref(), Some("complex_64"));
    match types.cache.kind(id) {
        TirTypeKind::Struct { fields } => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "re");
            assert_eq!(fields[1].name, "im");
            assert_eq!(fields[0].ty, fields[1].ty);
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_descriptor_shape() {
    let mut types = TypeLowerer::new();
    let ty = Ttype::deferred_array(Ttype::real(8), 2);
    let id = types.lower_type(&ty);
    match types.cache.kind(id).clone() {
        TirTypeKind::Struct { fields } => {
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[DESC_DATA].name, "data");
            assert_eq!(fields[DESC_OFFSET].name, "offset");
            assert_eq!(fields[DESC_DIMS].name, "dims");
            // dims points at { lower, size, stride } records
            let dim_ptr = fields[DESC_DIMS].ty;
            let dim_ty = types.cache.pointee(dim_ptr);
            match types.cache.kind(dim_ty) {
                TirTypeKind::Struct { fields } => {
                    let names: Vec<&str> =
                        fields.iter().map(|f| f.name.as_str()).collect();
                    assert_eq!(names, ["lower", "size", "stride"]);
                }
                other => panic!("unexpected dim kind {:?}", other),
            }
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_simd_lowers_to_vector() {
    let mut types = TypeLowerer::new();
    let ty = Ttype::Array {
        elem: Box::new(Ttype::real(4)),
        dims: vec![Dim::fixed(1, 8)],
        physical: crate::tast::PhysicalType::Simd,
    };
    let id = types.lower_type(&ty);
    assert!(matches!(
        types.cache.kind(id),
        TirTypeKind::Vector { lanes: 8, .. }
    ));
}

#[test]
fn test_inheritance_nests_parent_as_field_zero() {
    let module = animal_module();
    let mut types = TypeLowerer::new();
    types.register_structs(&module).expect("register");

    let dog = types.layout_of("dog").expect("dog layout");
    let animal = types.layout_of("animal").expect("animal layout");
    match types.cache.kind(dog.tir) {
        TirTypeKind::Struct { fields } => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[PARENT_FIELD].ty, animal.tir);
            assert_eq!(fields[1].name, "tail");
        }
        other => panic!("unexpected kind {:?}", other),
    }

    // Own field sits after the inherited header.
    let (path, ty) = types.field_path("dog", "tail").expect("tail");
    assert_eq!(path, vec![1]);
    assert_eq!(ty, Ttype::int(4));

    // Inherited field lookup walks the parent chain.
    let (path, ty) = types.field_path("dog", "age").expect("age");
    assert_eq!(path, vec![PARENT_FIELD, 0]);
    assert_eq!(ty, Ttype::int(4));

    assert!(types.field_path("dog", "whiskers").is_none());
}

#[test]
fn test_type_hashes_are_small_and_sequential() {
    let module = animal_module();
    let mut types = TypeLowerer::new();
    types.register_structs(&module).expect("register");

    let hashes: Vec<u64> = ["animal", "dog", "cat"]
        .iter()
        .map(|name| types.layout_of(name).unwrap().type_hash)
        .collect();
    assert_eq!(hashes, vec![1, 2, 3]);
}

#[test]
fn test_inheritance_closure() {
    let module = animal_module();
    let mut types = TypeLowerer::new();
    types.register_structs(&module).expect("register");

    assert!(types.extends("dog", "animal"));
    assert!(types.extends("animal", "animal"));
    assert!(!types.extends("animal", "dog"));

    let closure = types.concrete_types_extending("animal");
    assert_eq!(closure, vec!["animal", "dog", "cat"]);
    assert_eq!(types.concrete_types_extending("dog"), vec!["dog"]);
}

#[test]
fn test_storage_adds_indirection_for_args_and_pointers() {
    use crate::tast::{Intent, Storage, Symbol};
    let mut types = TypeLowerer::new();

    let local = Symbol::local("a", Ttype::int(8));
    let local_ty = types.storage_ty(&local);
    assert!(matches!(
        types.cache.kind(local_ty),
        TirTypeKind::Int { .. }
    ));

    let arg = Symbol::arg("b", Ttype::int(8), Intent::In);
    let arg_ty = types.storage_ty(&arg);
    assert!(matches!(types.cache.kind(arg_ty), TirTypeKind::Ptr { .. }));

    let ptr = Symbol::local("c", Ttype::int(8)).with_storage(Storage::Pointer);
    let ptr_ty = types.storage_ty(&ptr);
    assert!(matches!(types.cache.kind(ptr_ty), TirTypeKind::Ptr { .. }));
}
