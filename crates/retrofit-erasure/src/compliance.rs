//! Erasure compliance test helpers.
//!
//! These functions verify that an [`Erasure`] implementation satisfies
//! the equality and distance contract. Reused by the `AnyRef`, `PolyRef`
//! and `Nullable` test modules.

use std::fmt::Debug;

use retrofit_core::RefError;

use crate::erasure::Erasure;

/// Assert that every reference equals itself and a clone of itself.
pub fn assert_equality_reflexive<E: Erasure + Debug>(refs: &[E]) {
    for r in refs {
        assert!(r.equals(r), "{r:?} != itself");
        assert!(r.equals(&r.clone()), "{r:?} != its clone");
    }
}

/// Assert that `a == b` iff `b == a`, and that equality matches address
/// identity whenever both sides report one.
pub fn assert_equality_symmetric<E: Erasure + Debug>(refs: &[E]) {
    for a in refs {
        for b in refs {
            let ab = a.equals(b);
            let ba = b.equals(a);
            assert_eq!(ab, ba, "equals({a:?}, {b:?}) = {ab} but equals({b:?}, {a:?}) = {ba}");
            if ab {
                assert_eq!(a.address(), b.address(), "{a:?} == {b:?} at different addresses");
            }
        }
    }
}

/// Assert `distance(a, b) == -distance(b, a)` whenever both are defined,
/// and that an incompatibility is reported for both orders.
pub fn assert_distance_antisymmetric<E: Erasure + Debug>(refs: &[E]) {
    for a in refs {
        for b in refs {
            match (a.distance(b), b.distance(a)) {
                (Ok(dab), Ok(dba)) => assert_eq!(
                    dab,
                    -dba,
                    "distance({a:?}, {b:?}) = {dab} but distance({b:?}, {a:?}) = {dba}"
                ),
                (Err(RefError::IncompatibleBackingType { .. }), Ok(_))
                | (Ok(_), Err(RefError::IncompatibleBackingType { .. })) => {
                    panic!("incompatibility between {a:?} and {b:?} reported for one order only")
                }
                _ => {}
            }
        }
    }
}

/// Assert that `distance(a, a) == 0` wherever distance is supported.
pub fn assert_distance_reflexive<E: Erasure + Debug>(refs: &[E]) {
    for r in refs {
        if let Ok(d) = r.distance(r) {
            assert_eq!(d, 0, "distance({r:?}, {r:?}) = {d}, expected 0");
        }
    }
}

/// Assert that zero distance coincides with equality.
pub fn assert_distance_agrees_with_equality<E: Erasure + Debug>(refs: &[E]) {
    for a in refs {
        for b in refs {
            if let Ok(d) = a.distance(b) {
                assert_eq!(
                    d == 0,
                    a.equals(b),
                    "distance({a:?}, {b:?}) = {d} disagrees with equality"
                );
            }
        }
    }
}

/// Run all compliance checks over a set of references.
pub fn run_full_compliance<E: Erasure + Debug>(refs: &[E]) {
    assert_equality_reflexive(refs);
    assert_equality_symmetric(refs);
    assert_distance_antisymmetric(refs);
    assert_distance_reflexive(refs);
    assert_distance_agrees_with_equality(refs);
}
