use core::fmt;
use core::mem;

use serde_json::{Map, Value};

use crate::error::{ConvertError, ParamsError};
use crate::func::params_parser::{ParamsParser, write_pair};
use crate::func::{Signature, TypedArgs};
use crate::types::{DynValue, Typed};

/// Name of the parameter at `index` in strings and documents.
fn param_name(index: usize) -> String {
    format!("Param{index}")
}

// -----------------------------------------------------------------------------
// DynParams

/// A fixed-arity list of boxed arguments plus a return slot.
///
/// Every slot is typed by the bound [`Signature`]; values are checked and
/// normalized when they are stored.
///
/// The string form is positional, `Param0="1" Param1="abc"`. Parameter names
/// are written for readability but ignored when parsing.
///
/// # Example
///
/// ```
/// use pl_rtti::func::{DynParams, Signature};
/// use pl_rtti::types::DynValue;
///
/// let mut params = DynParams::new(Signature::of::<(), (i32, bool)>());
/// params.parse_into(r#"Param0="-3" Param1="true""#).unwrap();
/// assert_eq!(params.values(), &[DynValue::Int(-3), DynValue::Bool(true)]);
/// assert_eq!(params.to_param_string().unwrap(), r#"Param0="-3" Param1="true""#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DynParams {
    signature: Signature,
    values: Vec<DynValue>,
    ret: DynValue,
}

impl DynParams {
    /// Creates a parameter list holding the default value of every slot.
    pub fn new(signature: Signature) -> Self {
        let values = signature
            .params()
            .iter()
            .map(|info| info.default_value())
            .collect();
        let ret = signature.return_type().default_value();
        Self {
            signature,
            values,
            ret,
        }
    }

    /// Creates a parameter list from typed arguments.
    pub fn of<R: Typed, Args: TypedArgs>(args: Args) -> Self {
        let signature = Signature::of::<R, Args>();
        let ret = signature.return_type().default_value();
        Self {
            signature,
            values: args.into_values(),
            ret,
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DynValue> {
        self.values.get(index)
    }

    /// Stores `value` in slot `index`, converting it to the slot type.
    pub fn set(&mut self, index: usize, value: impl Into<DynValue>) -> Result<(), ParamsError> {
        let Some(info) = self.signature.params().get(index) else {
            return Err(ParamsError::Arity {
                expected: self.values.len(),
                found: index + 1,
            });
        };
        self.values[index] = info
            .coerce(value.into())
            .map_err(|source| ParamsError::Slot { index, source })?;
        Ok(())
    }

    #[inline]
    pub fn values(&self) -> &[DynValue] {
        &self.values
    }

    #[inline]
    pub fn return_value(&self) -> &DynValue {
        &self.ret
    }

    /// Stores the return value, converting it to the return type.
    pub fn set_return(&mut self, value: impl Into<DynValue>) -> Result<(), ConvertError> {
        self.ret = self.signature.return_type().coerce(value.into())?;
        Ok(())
    }

    /// Takes the return value out as a Rust value, leaving `Void` behind.
    pub fn take_return<R: Typed>(&mut self) -> Result<R, ConvertError> {
        R::from_value(mem::take(&mut self.ret))
    }

    #[inline]
    pub fn into_return(self) -> DynValue {
        self.ret
    }

    /// Fills the slots from a parameter string.
    ///
    /// The number of tokens must equal the arity, otherwise nothing is
    /// converted. If slot `i` fails to convert, slots `0..i` keep their new
    /// values and the rest are untouched.
    pub fn parse_into(&mut self, input: &str) -> Result<(), ParamsError> {
        let tokens = ParamsParser::new(input).collect::<Result<Vec<_>, _>>()?;
        if tokens.len() != self.values.len() {
            return Err(ParamsError::Arity {
                expected: self.values.len(),
                found: tokens.len(),
            });
        }
        for (index, token) in tokens.iter().enumerate() {
            let info = &self.signature.params()[index];
            self.values[index] = info
                .parse(&token.value)
                .map_err(|source| ParamsError::Slot { index, source })?;
        }
        Ok(())
    }

    /// Writes the slots as `Param0="..." Param1="..."`.
    pub fn to_param_string(&self) -> Result<String, ParamsError> {
        let mut out = String::new();
        for (index, (info, value)) in self.signature.params().iter().zip(&self.values).enumerate() {
            let text = info
                .format(value)
                .map_err(|source| ParamsError::Slot { index, source })?;
            write_pair(&mut out, &param_name(index), &text);
        }
        Ok(out)
    }

    /// Fills the slots from a document.
    ///
    /// Arrays are read positionally, objects by their `ParamN` keys. The
    /// number of entries must equal the arity. Slot failures behave like
    /// [`parse_into`](Self::parse_into).
    pub fn fill_from_document(&mut self, document: &Value) -> Result<(), ParamsError> {
        let found = match document {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => return Err(ParamsError::Document),
        };
        if found != self.values.len() {
            return Err(ParamsError::Arity {
                expected: self.values.len(),
                found,
            });
        }
        let nodes: Vec<&Value> = match document {
            Value::Object(map) => (0..self.values.len())
                .map(|index| {
                    let name = param_name(index);
                    map.get(&name).ok_or(ParamsError::MissingParam(name))
                })
                .collect::<Result<_, _>>()?,
            _ => document.as_array().into_iter().flatten().collect(),
        };
        for (index, node) in nodes.into_iter().enumerate() {
            let info = &self.signature.params()[index];
            self.values[index] = info
                .from_document(node)
                .map_err(|source| ParamsError::Slot { index, source })?;
        }
        Ok(())
    }

    /// Writes the slots as `{"Param0": ..., "Param1": ...}`.
    pub fn to_document(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .enumerate()
            .map(|(index, value)| (param_name(index), value.to_document()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Display for DynParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (index, value) in self.values.iter().enumerate() {
            write_pair(&mut out, &param_name(index), &value.to_string());
        }
        f.write_str(&out)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::DynParams;
    use crate::error::{ConvertError, ParamsError};
    use crate::func::Signature;
    use crate::types::{DynTypeInfo, DynValue, TypeKind};

    fn sample() -> DynParams {
        DynParams::new(Signature::of::<i32, (bool, i32, f32, String)>())
    }

    #[test]
    fn defaults_follow_signature() {
        let params = sample();
        assert_eq!(params.len(), 4);
        assert_eq!(
            params.values(),
            &[
                DynValue::Bool(false),
                DynValue::Int(0),
                DynValue::Float(0.0),
                DynValue::from("")
            ]
        );
        assert_eq!(params.return_value(), &DynValue::Int(0));
    }

    #[test]
    fn string_round_trip() {
        let mut params = sample();
        let input = r#"Param0="true" Param1="-17" Param2="2.5" Param3="a \"b\" c""#;
        params.parse_into(input).unwrap();
        assert_eq!(params.to_param_string().unwrap(), input);

        let mut again = sample();
        again.parse_into(&params.to_param_string().unwrap()).unwrap();
        assert_eq!(again, params);
    }

    #[test]
    fn names_are_ignored() {
        let mut params = sample();
        params.parse_into("X=1 Y=2 3 'four'").unwrap();
        assert_eq!(params.get(1), Some(&DynValue::Int(2)));
        assert_eq!(params.get(3), Some(&DynValue::from("four")));
    }

    #[test]
    fn arity_mismatch_converts_nothing() {
        let mut params = sample();
        assert_eq!(
            params.parse_into("true 1 2.0"),
            Err(ParamsError::Arity {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(params.get(0), Some(&DynValue::Bool(false)));
        assert!(params.parse_into("true 1 2.0 x y").is_err());
    }

    #[test]
    fn slot_failure_keeps_prefix() {
        let mut params = sample();
        let err = params.parse_into("true 9 nope x").unwrap_err();
        assert!(matches!(err, ParamsError::Slot { index: 2, .. }));
        assert_eq!(params.get(0), Some(&DynValue::Bool(true)));
        assert_eq!(params.get(1), Some(&DynValue::Int(9)));
        assert_eq!(params.get(2), Some(&DynValue::Float(0.0)));
        assert_eq!(params.get(3), Some(&DynValue::from("")));
    }

    #[test]
    fn set_and_return() {
        let mut params = sample();
        params.set(1, 5_u8).unwrap();
        assert_eq!(params.get(1), Some(&DynValue::Int(5)));
        assert!(matches!(
            params.set(1, "5"),
            Err(ParamsError::Slot { index: 1, .. })
        ));
        assert!(params.set(4, 1).is_err());

        params.set_return(12_i64).unwrap();
        assert_eq!(params.take_return::<i32>(), Ok(12));
        assert_eq!(params.return_value(), &DynValue::Void);
        assert_eq!(
            params.set_return(1.0_f32),
            Err(ConvertError::TypeMismatch {
                expected: TypeKind::Int32,
                found: TypeKind::Float
            })
        );
    }

    #[test]
    fn documents() {
        let mut params = sample();
        params
            .fill_from_document(&json!([true, 3, 0.5, "s"]))
            .unwrap();
        assert_eq!(
            params.to_document(),
            json!({"Param0": true, "Param1": 3, "Param2": 0.5, "Param3": "s"})
        );

        let mut other = sample();
        other.fill_from_document(&params.to_document()).unwrap();
        assert_eq!(other.values(), params.values());

        assert_eq!(other.fill_from_document(&json!(1)), Err(ParamsError::Document));
        assert!(matches!(
            other.fill_from_document(&json!([true])),
            Err(ParamsError::Arity { .. })
        ));
        assert_eq!(
            other.fill_from_document(
                &json!({"Param0": true, "Param1": 3, "Param2": 0.5, "Extra": "s"})
            ),
            Err(ParamsError::MissingParam("Param3".to_owned()))
        );
    }

    #[test]
    fn documents_keep_slot_order() {
        let signature = Signature::new(
            TypeKind::Void.into(),
            vec![DynTypeInfo::from(TypeKind::Int32); 11],
        );
        let mut params = DynParams::new(signature);
        let document: Map<String, Value> = (0..11)
            .map(|index| (format!("Param{index}"), json!(index)))
            .collect();
        params.fill_from_document(&Value::Object(document)).unwrap();
        let expected: Vec<_> = (0..11).map(DynValue::Int).collect();
        assert_eq!(params.values(), expected.as_slice());
    }

    #[test]
    fn param_string_round_trip() {
        let params = DynParams::of::<(), (bool, i32, f32, String)>((
            true,
            -7,
            2.5,
            String::from("say \"hi\""),
        ));
        let text = params.to_param_string().unwrap();

        let mut parsed = DynParams::new(params.signature().clone());
        parsed.parse_into(&text).unwrap();
        assert_eq!(parsed.values(), params.values());
        assert_eq!(parsed.to_param_string().unwrap(), text);
    }

    #[test]
    fn typed_construction() {
        let params = DynParams::of::<(), _>((1_u16, "x".to_owned()));
        assert_eq!(params.signature().to_string(), "void(uint16,String)");
        assert_eq!(params.to_string(), r#"Param0="1" Param1="x""#);
    }
}
