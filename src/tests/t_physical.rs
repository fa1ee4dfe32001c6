use super::*;

const ALL: [PhysicalType; 5] = [
    PhysicalType::Descriptor,
    PhysicalType::FixedSize,
    PhysicalType::PointerToData,
    PhysicalType::StringArraySinglePointer,
    PhysicalType::Simd,
];

#[test]
fn test_identity_always_convertible() {
    for phys in ALL {
        assert!(phys.convertible_to(phys));
    }
}

#[test]
fn test_simd_only_talks_to_fixed() {
    use PhysicalType::*;
    assert!(Simd.convertible_to(FixedSize));
    assert!(FixedSize.convertible_to(Simd));

    assert!(!Simd.convertible_to(Descriptor));
    assert!(!Descriptor.convertible_to(Simd));
    assert!(!Simd.convertible_to(PointerToData));
    assert!(!PointerToData.convertible_to(Simd));
    assert!(!Simd.convertible_to(StringArraySinglePointer));
    assert!(!StringArraySinglePointer.convertible_to(Simd));
}

#[test]
fn test_data_shapes_fully_connected() {
    use PhysicalType::*;
    let data_shapes = [Descriptor, FixedSize, PointerToData, StringArraySinglePointer];
    for a in data_shapes {
        for b in data_shapes {
            assert!(
                a.convertible_to(b),
                "{:?} -> {:?} should be legal",
                a,
                b
            );
        }
    }
}

#[test]
fn test_transition_table_is_symmetric() {
    for a in ALL {
        for b in ALL {
            assert_eq!(a.convertible_to(b), b.convertible_to(a));
        }
    }
}

#[test]
fn test_dim_staticness() {
    assert!(Dim::fixed(1, 3).is_static());
    assert!(!Dim::deferred().is_static());
}

#[test]
fn test_scalar_aggregate_split() {
    assert!(Ttype::int(4).is_scalar());
    assert!(Ttype::Logical.is_scalar());
    assert!(Ttype::CPtr.is_scalar());

    assert!(Ttype::complex(8).is_aggregate());
    assert!(Ttype::character(10).is_aggregate());
    assert!(Ttype::fixed_array(Ttype::real(8), &[3]).is_aggregate());
    assert!(Ttype::Struct {
        name: "point".to_string()
    }
    .is_aggregate());
}
