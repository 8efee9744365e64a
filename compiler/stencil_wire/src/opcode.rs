//! Opcode table.
//!
//! Every statement and expression array starts with one of these tags.
//! The numbers are part of the wire format and never change; gaps are
//! opcodes the runtime reserves.

use serde::{Serialize, Serializer};
use stencil_ir::norm::{FreeVarNamespaces, Resolution};

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SexpOpcode {
    // ─── Statements ───
    Append = 1,
    TrustingAppend = 2,
    Comment = 3,
    Modifier = 4,
    Block = 6,
    Component = 8,
    OpenElement = 10,
    OpenElementWithSplat = 11,
    FlushElement = 12,
    CloseElement = 13,
    StaticAttr = 14,
    DynamicAttr = 15,
    ComponentAttr = 16,
    AttrSplat = 17,
    Yield = 18,
    Partial = 19,
    TrustingDynamicAttr = 22,
    TrustingComponentAttr = 23,
    StaticComponentAttr = 24,
    Debugger = 26,

    // ─── Expressions ───
    Undefined = 27,
    Call = 28,
    Concat = 29,
    GetSymbol = 30,
    GetStrictFree = 31,
    GetFreeAsComponentOrHelperHeadOrThisFallback = 34,
    GetFreeAsComponentOrHelperHead = 35,
    GetFreeAsHelperHeadOrThisFallback = 36,
    GetFreeAsHelperHead = 37,
    GetFreeAsModifierHead = 38,
    GetFreeAsComponentHead = 39,

    // ─── Keywords ───
    InElement = 40,
    If = 41,
    Each = 42,
    With = 43,
    Let = 44,
    WithDynamicVars = 45,
    InvokeComponent = 46,
    HasBlock = 48,
    HasBlockParams = 49,
    Curry = 50,
    Not = 51,
    IfInline = 52,
    GetDynamicVar = 53,
    Log = 54,
}

impl SexpOpcode {
    /// Numeric tag as written to the wire.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Opcode that reads a free variable resolved with `resolution`.
    pub fn for_resolution(resolution: Resolution) -> SexpOpcode {
        let Resolution::Loose {
            namespaces,
            allows_fallback,
        } = resolution
        else {
            return SexpOpcode::GetStrictFree;
        };
        if namespaces == FreeVarNamespaces::HELPER {
            if allows_fallback {
                SexpOpcode::GetFreeAsHelperHeadOrThisFallback
            } else {
                SexpOpcode::GetFreeAsHelperHead
            }
        } else if namespaces == FreeVarNamespaces::MODIFIER {
            SexpOpcode::GetFreeAsModifierHead
        } else if namespaces == FreeVarNamespaces::COMPONENT {
            SexpOpcode::GetFreeAsComponentHead
        } else if allows_fallback || namespaces.is_empty() {
            SexpOpcode::GetFreeAsComponentOrHelperHeadOrThisFallback
        } else {
            SexpOpcode::GetFreeAsComponentOrHelperHead
        }
    }
}

impl Serialize for SexpOpcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_fixed() {
        assert_eq!(SexpOpcode::Append.code(), 1);
        assert_eq!(SexpOpcode::Component.code(), 8);
        assert_eq!(SexpOpcode::StaticComponentAttr.code(), 24);
        assert_eq!(SexpOpcode::GetFreeAsComponentHead.code(), 39);
        assert_eq!(SexpOpcode::InvokeComponent.code(), 46);
        assert_eq!(SexpOpcode::Log.code(), 54);
    }

    #[test]
    fn test_resolution_opcodes() {
        let loose = Resolution::loose;
        let both = FreeVarNamespaces::COMPONENT | FreeVarNamespaces::HELPER;
        let cases = [
            (Resolution::Strict, 31),
            (Resolution::FALLBACK, 34),
            (loose(both, true), 34),
            (loose(both, false), 35),
            (loose(FreeVarNamespaces::HELPER, true), 36),
            (loose(FreeVarNamespaces::HELPER, false), 37),
            (loose(FreeVarNamespaces::MODIFIER, false), 38),
            (loose(FreeVarNamespaces::COMPONENT, false), 39),
        ];
        for (resolution, code) in cases {
            assert_eq!(
                SexpOpcode::for_resolution(resolution).code(),
                code,
                "{resolution:?}"
            );
        }
    }
}
