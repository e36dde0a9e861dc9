//! `Serialize` for pointers and views: a pointer serializes as the value it
//! points to, a view as a sequence of its elements.
//!
//! Nothing here deserializes; a non-owning pointer has nowhere to put the
//! value.

use serde::{Serialize, Serializer};

use crate::array::ArrayPointer;
use crate::mutability::Mutability;
use crate::nullable::{NullablePointer, Nullable};
use crate::pointer::Pointer;
use crate::slice::SliceView;

impl<T: ?Sized + Serialize, M: Mutability> Serialize for Pointer<'_, T, M> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_ref().serialize(serializer)
    }
}

impl<T: Serialize> Serialize for SliceView<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self)
    }
}

impl<T: Serialize, M: Mutability> Serialize for ArrayPointer<'_, T, M> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_ref().serialize(serializer)
    }
}

impl<P: NullablePointer + Serialize> Serialize for Nullable<P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.get() {
            Some(ptr) => serializer.serialize_some(&ptr),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{pointer_to, pointer_to_array, pointer_to_mut_array, Nullable, Pointer};
    use std::collections::BTreeMap;

    #[test]
    fn pointers_serialize_their_referent() {
        let mut record = BTreeMap::new();
        record.insert("name", "crust");
        let p = pointer_to(&record);
        assert_eq!(
            serde_json::to_string(&p).expect("Failed to serialize pointer"),
            r#"{"name":"crust"}"#
        );

        let s = pointer_to("hello world");
        assert_eq!(
            serde_json::to_string(&s).expect("Failed to serialize str pointer"),
            r#""hello world""#
        );
    }

    #[test]
    fn arrays_and_views_serialize_as_sequences() {
        let mut values = vec![1.5, 2.5, 3.5];
        let p = pointer_to_mut_array(&mut values);
        assert_eq!(
            serde_json::to_string(&p).expect("Failed to serialize array pointer"),
            "[1.5,2.5,3.5]"
        );

        let empty: [u8; 0] = [];
        let view = &*pointer_to_array(&empty);
        assert_eq!(
            serde_json::to_value(view).expect("Failed to serialize view"),
            serde_json::json!([])
        );
    }

    #[test]
    fn nullable_serializes_as_option() {
        let x = 7;
        let present = Nullable::present(pointer_to(&x));
        let absent: Nullable<Pointer<'_, i32>> = Nullable::new();
        assert_eq!(serde_json::to_string(&present).expect("present"), "7");
        assert_eq!(serde_json::to_string(&absent).expect("absent"), "null");
    }
}
