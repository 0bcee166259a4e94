//! The issue catalog.
//!
//! An [`Issue`] is a catalog entry describing a class of diagnostic: a
//! stable type name, a category, a severity, a `{0}`-indexed message
//! template, a coarse remediation effort and a stable numeric id. An
//! [`IssueInstance`] binds an issue to a source location and template
//! arguments.
//!
//! The catalog is fixed at compile time; see [`catalog`].

use bitflags::bitflags;
use std::fmt;

/// Issue severity. The numeric values are part of the configuration
/// surface (`minimum_severity`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Low = 0,
    Normal = 5,
    Critical = 10,
}

impl Severity {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            5 => Some(Self::Normal),
            10 => Some(Self::Critical),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Critical => "critical",
        }
    }
}

bitflags! {
    /// Issue category bitmask, usable as an output filter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct IssueCategory: u32 {
        const UNDEFINED  = 1 << 1;
        const TYPE       = 1 << 2;
        const ANALYSIS   = 1 << 3;
        const ACCESS     = 1 << 4;
        const COMPATIBLE = 1 << 5;
        const CONTEXT    = 1 << 6;
        const DEPRECATED = 1 << 7;
        const NOOP       = 1 << 8;
        const PARAMETER  = 1 << 9;
        const REDEFINE   = 1 << 10;
        const STATIC     = 1 << 11;
        const VARIABLE   = 1 << 12;
        const SYNTAX     = 1 << 13;
        const GENERIC    = 1 << 14;
    }
}

/// Coarse remediation effort estimates, in arbitrary "cost" units.
pub mod remediation {
    pub const TRIVIAL: u32 = 1_000;
    pub const SMALL: u32 = 5_000;
    pub const MEDIUM: u32 = 10_000;
    pub const LARGE: u32 = 50_000;
}

/// A catalog entry describing a diagnostic class.
#[derive(Debug, PartialEq, Eq)]
pub struct Issue {
    /// Stable type name, e.g. `PhanUndeclaredClass`.
    pub name: &'static str,
    pub category: IssueCategory,
    pub severity: Severity,
    /// Message template with `{0}`-indexed placeholders.
    pub template: &'static str,
    /// Remediation effort estimate, see [`remediation`].
    pub remediation: u32,
    /// Stable numeric id.
    pub id: u16,
}

impl Issue {
    const fn new(
        name: &'static str,
        category: IssueCategory,
        severity: Severity,
        template: &'static str,
        remediation: u32,
        id: u16,
    ) -> Self {
        Self {
            name,
            category,
            severity,
            template,
            remediation,
            id,
        }
    }
}

/// Render a `{0}`-indexed template with positional arguments.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut result = template.to_owned();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// An issue bound to a source location and template arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueInstance {
    pub issue: &'static Issue,
    pub file: String,
    pub line: u32,
    pub args: Vec<String>,
}

impl IssueInstance {
    pub fn new(
        issue: &'static Issue,
        file: impl Into<String>,
        line: u32,
        args: Vec<String>,
    ) -> Self {
        Self {
            issue,
            file: file.into(),
            line,
            args,
        }
    }

    /// The rendered message.
    #[must_use]
    pub fn message(&self) -> String {
        format_message(self.issue.template, &self.args)
    }
}

impl fmt::Display for IssueInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {}",
            self.file,
            self.line,
            self.issue.name,
            self.message()
        )
    }
}

/// The fixed issue catalog.
///
/// Numeric id blocks follow the category: 1xxx undefined, 2xxx type,
/// 3xxx parameter, 4xxx redefine, 5xxx access, 6xxx noop, 7xxx
/// deprecated, 8xxx compatibility, 9xxx static, 10xxx context, 11xxx
/// analysis, 12xxx generic, 13xxx syntax.
pub mod catalog {
    use super::remediation::{MEDIUM, SMALL, TRIVIAL};
    use super::{Issue, IssueCategory, Severity};

    const UNDEF: IssueCategory = IssueCategory::UNDEFINED;
    const TYPE: IssueCategory = IssueCategory::TYPE;
    const PARAM: IssueCategory = IssueCategory::PARAMETER;
    const REDEF: IssueCategory = IssueCategory::REDEFINE;
    const ACCESS: IssueCategory = IssueCategory::ACCESS;
    const NOOP: IssueCategory = IssueCategory::NOOP;
    const DEPREC: IssueCategory = IssueCategory::DEPRECATED;
    const COMPAT: IssueCategory = IssueCategory::COMPATIBLE;
    const STATIC: IssueCategory = IssueCategory::STATIC;
    const CONTEXT: IssueCategory = IssueCategory::CONTEXT;
    const ANALYSIS: IssueCategory = IssueCategory::ANALYSIS;
    const GENERIC: IssueCategory = IssueCategory::GENERIC;
    const SYNTAX: IssueCategory = IssueCategory::SYNTAX;

    use super::Severity::{Critical, Low, Normal};

    // ==================== Undefined ====================

    pub static UNDECLARED_CLASS: Issue = Issue::new(
        "PhanUndeclaredClass",
        UNDEF, Critical, "Reference to undeclared class {0}", MEDIUM, 1000,
    );
    pub static UNDECLARED_CLASS_CATCH: Issue = Issue::new(
        "PhanUndeclaredClassCatch",
        UNDEF, Critical, "Catching undeclared class {0}", MEDIUM, 1001,
    );
    pub static UNDECLARED_CLASS_CONSTANT: Issue = Issue::new(
        "PhanUndeclaredClassConstant",
        UNDEF, Critical, "Reference to constant {0} from undeclared class {1}", MEDIUM, 1002,
    );
    pub static UNDECLARED_CLASS_INSTANCEOF: Issue = Issue::new(
        "PhanUndeclaredClassInstanceof",
        UNDEF, Critical, "Checking instanceof against undeclared class {0}", SMALL, 1003,
    );
    pub static UNDECLARED_CLASS_METHOD: Issue = Issue::new(
        "PhanUndeclaredClassMethod",
        UNDEF, Critical, "Call to method {0} from undeclared class {1}", MEDIUM, 1004,
    );
    pub static UNDECLARED_CONSTANT: Issue = Issue::new(
        "PhanUndeclaredConstant",
        UNDEF, Critical, "Reference to undeclared constant {0}", MEDIUM, 1005,
    );
    pub static UNDECLARED_EXTENDED_CLASS: Issue = Issue::new(
        "PhanUndeclaredExtendedClass",
        UNDEF, Critical, "Class extends undeclared class {0}", MEDIUM, 1006,
    );
    pub static UNDECLARED_FUNCTION: Issue = Issue::new(
        "PhanUndeclaredFunction",
        UNDEF, Critical, "Call to undeclared function {0}", MEDIUM, 1007,
    );
    pub static UNDECLARED_INTERFACE: Issue = Issue::new(
        "PhanUndeclaredInterface",
        UNDEF, Critical, "Class implements undeclared interface {0}", MEDIUM, 1008,
    );
    pub static UNDECLARED_METHOD: Issue = Issue::new(
        "PhanUndeclaredMethod",
        UNDEF, Critical, "Call to undeclared method {0}", MEDIUM, 1009,
    );
    pub static UNDECLARED_PROPERTY: Issue = Issue::new(
        "PhanUndeclaredProperty",
        UNDEF, Normal, "Reference to undeclared property {0}", SMALL, 1010,
    );
    pub static UNDECLARED_STATIC_METHOD: Issue = Issue::new(
        "PhanUndeclaredStaticMethod",
        UNDEF, Critical, "Static call to undeclared method {0}", MEDIUM, 1011,
    );
    pub static UNDECLARED_STATIC_PROPERTY: Issue = Issue::new(
        "PhanUndeclaredStaticProperty",
        UNDEF, Normal, "Static property {0} on undeclared class {1}", SMALL, 1012,
    );
    pub static UNDECLARED_TRAIT: Issue = Issue::new(
        "PhanUndeclaredTrait",
        UNDEF, Critical, "Class uses undeclared trait {0}", MEDIUM, 1013,
    );
    pub static UNDECLARED_TYPE_PARAMETER: Issue = Issue::new(
        "PhanUndeclaredTypeParameter",
        UNDEF, Normal, "Parameter of undeclared type {0}", SMALL, 1014,
    );
    pub static UNDECLARED_TYPE_PROPERTY: Issue = Issue::new(
        "PhanUndeclaredTypeProperty",
        UNDEF, Normal, "Property {0} has undeclared type {1}", SMALL, 1015,
    );
    pub static UNDECLARED_TYPE_RETURN_TYPE: Issue = Issue::new(
        "PhanUndeclaredTypeReturnType",
        UNDEF, Normal, "Return type of {0} is undeclared type {1}", SMALL, 1016,
    );
    pub static UNDECLARED_VARIABLE: Issue = Issue::new(
        "PhanUndeclaredVariable",
        UNDEF, Normal, "Variable ${0} is undeclared", SMALL, 1017,
    );
    pub static PARENTLESS_CLASS: Issue = Issue::new(
        "PhanParentlessClass",
        UNDEF, Critical, "Reference to parent of class {0} which does not extend anything", MEDIUM, 1018,
    );

    // ==================== Type ====================

    pub static NON_CLASS_METHOD_CALL: Issue = Issue::new(
        "PhanNonClassMethodCall",
        TYPE, Critical, "Call to method {0} on non-class type {1}", MEDIUM, 2000,
    );
    pub static TYPE_ARRAY_OPERATOR: Issue = Issue::new(
        "PhanTypeArrayOperator",
        TYPE, Normal, "Invalid array operator between types {0} and {1}", SMALL, 2001,
    );
    pub static TYPE_ARRAY_SUSPICIOUS: Issue = Issue::new(
        "PhanTypeArraySuspicious",
        TYPE, Normal, "Suspicious array access to {0}", SMALL, 2002,
    );
    pub static TYPE_COMPARISON_FROM_ARRAY: Issue = Issue::new(
        "PhanTypeComparisonFromArray",
        TYPE, Low, "array to {0} comparison", TRIVIAL, 2003,
    );
    pub static TYPE_COMPARISON_TO_ARRAY: Issue = Issue::new(
        "PhanTypeComparisonToArray",
        TYPE, Low, "{0} to array comparison", TRIVIAL, 2004,
    );
    pub static TYPE_INSTANTIATE_ABSTRACT: Issue = Issue::new(
        "PhanTypeInstantiateAbstract",
        TYPE, Critical, "Instantiation of abstract class {0}", MEDIUM, 2005,
    );
    pub static TYPE_INSTANTIATE_INTERFACE: Issue = Issue::new(
        "PhanTypeInstantiateInterface",
        TYPE, Critical, "Instantiation of interface {0}", MEDIUM, 2006,
    );
    pub static TYPE_INVALID_LEFT_OPERAND: Issue = Issue::new(
        "PhanTypeInvalidLeftOperand",
        TYPE, Normal, "Invalid operator: left operand is array and right is not", SMALL, 2007,
    );
    pub static TYPE_INVALID_RIGHT_OPERAND: Issue = Issue::new(
        "PhanTypeInvalidRightOperand",
        TYPE, Normal, "Invalid operator: right operand is array and left is not", SMALL, 2008,
    );
    pub static TYPE_MISMATCH_ARGUMENT: Issue = Issue::new(
        "PhanTypeMismatchArgument",
        TYPE, Normal,
        "Argument {0} ({1}) is {2} but {3}() takes {4} defined at {5}:{6}", SMALL, 2009,
    );
    pub static TYPE_MISMATCH_ARGUMENT_INTERNAL: Issue = Issue::new(
        "PhanTypeMismatchArgumentInternal",
        TYPE, Normal, "Argument {0} ({1}) is {2} but {3}() takes {4}", SMALL, 2010,
    );
    pub static TYPE_MISMATCH_DEFAULT: Issue = Issue::new(
        "PhanTypeMismatchDefault",
        TYPE, Normal, "Default value for {0} ${1} can't be {2}", SMALL, 2011,
    );
    pub static TYPE_MISMATCH_FOREACH: Issue = Issue::new(
        "PhanTypeMismatchForeach",
        TYPE, Normal, "{0} passed to foreach instead of array", SMALL, 2012,
    );
    pub static TYPE_MISMATCH_PROPERTY: Issue = Issue::new(
        "PhanTypeMismatchProperty",
        TYPE, Normal, "Assigning {0} to property but {1} is {2}", SMALL, 2013,
    );
    pub static TYPE_MISMATCH_RETURN: Issue = Issue::new(
        "PhanTypeMismatchReturn",
        TYPE, Normal, "Returning type {0} but {1}() is declared to return {2}", SMALL, 2014,
    );
    pub static TYPE_MISSING_RETURN: Issue = Issue::new(
        "PhanTypeMissingReturn",
        TYPE, Normal, "Method {0} is declared to return {1} but has no return value", SMALL, 2015,
    );
    pub static TYPE_NON_VAR_PASS_BY_REF: Issue = Issue::new(
        "PhanTypeNonVarPassByRef",
        TYPE, Normal, "Only variables can be passed by reference at argument {0} in {1}()", SMALL, 2016,
    );
    pub static TYPE_PARENT_CONSTRUCTOR_CALLED: Issue = Issue::new(
        "PhanTypeParentConstructorCalled",
        TYPE, Normal, "Must call parent::__construct() from {0} which extends {1}", SMALL, 2017,
    );

    // ==================== Parameter ====================

    pub static PARAM_REQ_AFTER_OPT: Issue = Issue::new(
        "PhanParamReqAfterOpt",
        PARAM, Low, "Required argument follows optional", SMALL, 3000,
    );
    pub static PARAM_SPECIAL1: Issue = Issue::new(
        "PhanParamSpecial1",
        PARAM, Normal,
        "Argument {0} ({1}) is {2} but {3}() takes {4} when argument {5} is {6}", SMALL, 3001,
    );
    pub static PARAM_SPECIAL2: Issue = Issue::new(
        "PhanParamSpecial2",
        PARAM, Normal,
        "Argument {0} ({1}) is {2} but {3}() takes {4} when passed only one argument", SMALL, 3002,
    );
    pub static PARAM_SPECIAL3: Issue = Issue::new(
        "PhanParamSpecial3",
        PARAM, Normal, "The last argument to {0} must be of type {1}", SMALL, 3003,
    );
    pub static PARAM_SPECIAL4: Issue = Issue::new(
        "PhanParamSpecial4",
        PARAM, Normal, "The second to last argument to {0} must be of type {1}", SMALL, 3004,
    );
    pub static PARAM_TOO_FEW: Issue = Issue::new(
        "PhanParamTooFew",
        PARAM, Normal,
        "Call with {0} arg(s) to {1}() which requires {2} arg(s) defined at {3}:{4}", SMALL, 3005,
    );
    pub static PARAM_TOO_FEW_INTERNAL: Issue = Issue::new(
        "PhanParamTooFewInternal",
        PARAM, Normal, "Call with {0} arg(s) to {1}() which requires {2} arg(s)", SMALL, 3006,
    );
    pub static PARAM_TOO_MANY: Issue = Issue::new(
        "PhanParamTooMany",
        PARAM, Low,
        "Call with {0} arg(s) to {1}() which only takes {2} arg(s) defined at {3}:{4}", SMALL, 3007,
    );
    pub static PARAM_TOO_MANY_INTERNAL: Issue = Issue::new(
        "PhanParamTooManyInternal",
        PARAM, Low, "Call with {0} arg(s) to {1}() which only takes {2} arg(s)", SMALL, 3008,
    );
    pub static SIGNATURE_MISMATCH: Issue = Issue::new(
        "PhanSignatureMismatch",
        PARAM, Normal, "Declaration of {0} should be compatible with {1} defined in {2}:{3}", MEDIUM, 3009,
    );
    pub static SIGNATURE_MISMATCH_INTERNAL: Issue = Issue::new(
        "PhanSignatureMismatchInternal",
        PARAM, Normal, "Declaration of {0} should be compatible with internal {1}", MEDIUM, 3010,
    );

    // ==================== Redefine ====================

    pub static REDEFINE_CLASS: Issue = Issue::new(
        "PhanRedefineClass",
        REDEF, Normal, "{0} defined at {1}:{2} was previously defined as {3} at {4}:{5}", MEDIUM, 4000,
    );
    pub static REDEFINE_FUNCTION: Issue = Issue::new(
        "PhanRedefineFunction",
        REDEF, Normal, "Function {0} defined at {1}:{2} was previously defined at {3}:{4}", MEDIUM, 4001,
    );
    pub static REDEFINE_FUNCTION_INTERNAL: Issue = Issue::new(
        "PhanRedefineFunctionInternal",
        REDEF, Normal, "Function {0} defined at {1}:{2} was previously defined internally", MEDIUM, 4002,
    );
    pub static INCOMPATIBLE_COMPOSITION_PROP: Issue = Issue::new(
        "PhanIncompatibleCompositionProp",
        REDEF, Normal,
        "{0} and {1} define the same property ({2}) in the composition of {3} with incompatible types", MEDIUM, 4003,
    );
    pub static INCOMPATIBLE_COMPOSITION_METHOD: Issue = Issue::new(
        "PhanIncompatibleCompositionMethod",
        REDEF, Normal, "Declaration of {0} must be compatible with {1} in {2} on line {3}", MEDIUM, 4004,
    );

    // ==================== Access ====================

    pub static ACCESS_PROPERTY_PRIVATE: Issue = Issue::new(
        "PhanAccessPropertyPrivate",
        ACCESS, Critical, "Cannot access private property {0}", SMALL, 5000,
    );
    pub static ACCESS_PROPERTY_PROTECTED: Issue = Issue::new(
        "PhanAccessPropertyProtected",
        ACCESS, Critical, "Cannot access protected property {0}", SMALL, 5001,
    );
    pub static ACCESS_METHOD_PRIVATE: Issue = Issue::new(
        "PhanAccessMethodPrivate",
        ACCESS, Critical, "Cannot access private method {0} defined at {1}:{2}", SMALL, 5002,
    );
    pub static ACCESS_METHOD_PROTECTED: Issue = Issue::new(
        "PhanAccessMethodProtected",
        ACCESS, Critical, "Cannot access protected method {0} defined at {1}:{2}", SMALL, 5003,
    );
    pub static ACCESS_SIGNATURE_MISMATCH: Issue = Issue::new(
        "PhanAccessSignatureMismatch",
        ACCESS, Normal, "Access level to {0} must be compatible with {1} defined in {2}:{3}", MEDIUM, 5004,
    );
    pub static ACCESS_STATIC_TO_NON_STATIC: Issue = Issue::new(
        "PhanAccessStaticToNonStatic",
        ACCESS, Normal, "Making static method {0}() non static", MEDIUM, 5005,
    );
    pub static ACCESS_NON_STATIC_TO_STATIC: Issue = Issue::new(
        "PhanAccessNonStaticToStatic",
        ACCESS, Normal, "Making non static method {0}() static", MEDIUM, 5006,
    );

    // ==================== Noop ====================

    pub static NOOP_ARRAY: Issue = Issue::new(
        "PhanNoopArray",
        NOOP, Low, "Unused array", TRIVIAL, 6000,
    );
    pub static NOOP_CLOSURE: Issue = Issue::new(
        "PhanNoopClosure",
        NOOP, Low, "Unused closure", TRIVIAL, 6001,
    );
    pub static NOOP_CONSTANT: Issue = Issue::new(
        "PhanNoopConstant",
        NOOP, Low, "Unused constant", TRIVIAL, 6002,
    );
    pub static NOOP_PROPERTY: Issue = Issue::new(
        "PhanNoopProperty",
        NOOP, Low, "Unused property", TRIVIAL, 6003,
    );
    pub static NOOP_VARIABLE: Issue = Issue::new(
        "PhanNoopVariable",
        NOOP, Low, "Unused variable", TRIVIAL, 6004,
    );
    pub static UNREFERENCED_CLASS: Issue = Issue::new(
        "PhanUnreferencedClass",
        NOOP, Normal, "Possibly zero references to class {0}", TRIVIAL, 6005,
    );
    pub static UNREFERENCED_METHOD: Issue = Issue::new(
        "PhanUnreferencedMethod",
        NOOP, Normal, "Possibly zero references to method {0}", TRIVIAL, 6006,
    );
    pub static UNREFERENCED_PROPERTY: Issue = Issue::new(
        "PhanUnreferencedProperty",
        NOOP, Normal, "Possibly zero references to property {0}", TRIVIAL, 6007,
    );
    pub static UNREFERENCED_CONSTANT: Issue = Issue::new(
        "PhanUnreferencedConstant",
        NOOP, Normal, "Possibly zero references to constant {0}", TRIVIAL, 6008,
    );
    pub static UNREFERENCED_FUNCTION: Issue = Issue::new(
        "PhanUnreferencedFunction",
        NOOP, Normal, "Possibly zero references to function {0}", TRIVIAL, 6009,
    );

    // ==================== Deprecated ====================

    pub static DEPRECATED_CLASS: Issue = Issue::new(
        "PhanDeprecatedClass",
        DEPREC, Normal, "Using a deprecated class {0} defined at {1}:{2}", SMALL, 7000,
    );
    pub static DEPRECATED_FUNCTION: Issue = Issue::new(
        "PhanDeprecatedFunction",
        DEPREC, Normal, "Call to deprecated function {0}() defined at {1}:{2}", SMALL, 7001,
    );
    pub static DEPRECATED_PROPERTY: Issue = Issue::new(
        "PhanDeprecatedProperty",
        DEPREC, Normal, "Reference to deprecated property {0} defined at {1}:{2}", SMALL, 7002,
    );

    // ==================== Compatibility ====================

    pub static COMPATIBLE_PHP7: Issue = Issue::new(
        "PhanCompatiblePHP7",
        COMPAT, Normal,
        "Expression may not be PHP 7 compatible: dynamic property access order changed", SMALL, 8000,
    );

    // ==================== Static ====================

    pub static STATIC_CALL_TO_NON_STATIC: Issue = Issue::new(
        "PhanStaticCallToNonStatic",
        STATIC, Normal, "Static call to non-static method {0} defined at {1}:{2}", MEDIUM, 9000,
    );

    // ==================== Context ====================

    pub static CONTEXT_NOT_OBJECT: Issue = Issue::new(
        "PhanContextNotObject",
        CONTEXT, Critical, "Cannot access {0} when not in object context", SMALL, 10000,
    );

    // ==================== Analysis ====================

    pub static UNANALYZABLE: Issue = Issue::new(
        "PhanUnanalyzable",
        ANALYSIS, Low,
        "Expression is unanalyzable or feature is unimplemented", SMALL, 11000,
    );

    // ==================== Generic ====================

    pub static GENERIC_CONSTRUCTOR_TYPES: Issue = Issue::new(
        "PhanGenericConstructorTypes",
        GENERIC, Normal, "Missing template parameters {0} on constructor for generic class {1}", SMALL, 12000,
    );
    pub static TEMPLATE_TYPE_NOT_DECLARED: Issue = Issue::new(
        "PhanTemplateTypeNotDeclaredInFunctionParams",
        GENERIC, Normal, "Template type {0} not declared in function params", SMALL, 12001,
    );

    // ==================== Syntax ====================

    pub static SYNTAX_ERROR: Issue = Issue::new(
        "PhanSyntaxError",
        SYNTAX, Critical, "{0}", TRIVIAL, 13000,
    );

    /// Every catalog entry, for name lookup and documentation dumps.
    pub static ALL: &[&Issue] = &[
        &UNDECLARED_CLASS,
        &UNDECLARED_CLASS_CATCH,
        &UNDECLARED_CLASS_CONSTANT,
        &UNDECLARED_CLASS_INSTANCEOF,
        &UNDECLARED_CLASS_METHOD,
        &UNDECLARED_CONSTANT,
        &UNDECLARED_EXTENDED_CLASS,
        &UNDECLARED_FUNCTION,
        &UNDECLARED_INTERFACE,
        &UNDECLARED_METHOD,
        &UNDECLARED_PROPERTY,
        &UNDECLARED_STATIC_METHOD,
        &UNDECLARED_STATIC_PROPERTY,
        &UNDECLARED_TRAIT,
        &UNDECLARED_TYPE_PARAMETER,
        &UNDECLARED_TYPE_PROPERTY,
        &UNDECLARED_TYPE_RETURN_TYPE,
        &UNDECLARED_VARIABLE,
        &PARENTLESS_CLASS,
        &NON_CLASS_METHOD_CALL,
        &TYPE_ARRAY_OPERATOR,
        &TYPE_ARRAY_SUSPICIOUS,
        &TYPE_COMPARISON_FROM_ARRAY,
        &TYPE_COMPARISON_TO_ARRAY,
        &TYPE_INSTANTIATE_ABSTRACT,
        &TYPE_INSTANTIATE_INTERFACE,
        &TYPE_INVALID_LEFT_OPERAND,
        &TYPE_INVALID_RIGHT_OPERAND,
        &TYPE_MISMATCH_ARGUMENT,
        &TYPE_MISMATCH_ARGUMENT_INTERNAL,
        &TYPE_MISMATCH_DEFAULT,
        &TYPE_MISMATCH_FOREACH,
        &TYPE_MISMATCH_PROPERTY,
        &TYPE_MISMATCH_RETURN,
        &TYPE_MISSING_RETURN,
        &TYPE_NON_VAR_PASS_BY_REF,
        &TYPE_PARENT_CONSTRUCTOR_CALLED,
        &PARAM_REQ_AFTER_OPT,
        &PARAM_SPECIAL1,
        &PARAM_SPECIAL2,
        &PARAM_SPECIAL3,
        &PARAM_SPECIAL4,
        &PARAM_TOO_FEW,
        &PARAM_TOO_FEW_INTERNAL,
        &PARAM_TOO_MANY,
        &PARAM_TOO_MANY_INTERNAL,
        &SIGNATURE_MISMATCH,
        &SIGNATURE_MISMATCH_INTERNAL,
        &REDEFINE_CLASS,
        &REDEFINE_FUNCTION,
        &REDEFINE_FUNCTION_INTERNAL,
        &INCOMPATIBLE_COMPOSITION_PROP,
        &INCOMPATIBLE_COMPOSITION_METHOD,
        &ACCESS_PROPERTY_PRIVATE,
        &ACCESS_PROPERTY_PROTECTED,
        &ACCESS_METHOD_PRIVATE,
        &ACCESS_METHOD_PROTECTED,
        &ACCESS_SIGNATURE_MISMATCH,
        &ACCESS_STATIC_TO_NON_STATIC,
        &ACCESS_NON_STATIC_TO_STATIC,
        &NOOP_ARRAY,
        &NOOP_CLOSURE,
        &NOOP_CONSTANT,
        &NOOP_PROPERTY,
        &NOOP_VARIABLE,
        &UNREFERENCED_CLASS,
        &UNREFERENCED_METHOD,
        &UNREFERENCED_PROPERTY,
        &UNREFERENCED_CONSTANT,
        &UNREFERENCED_FUNCTION,
        &DEPRECATED_CLASS,
        &DEPRECATED_FUNCTION,
        &DEPRECATED_PROPERTY,
        &COMPATIBLE_PHP7,
        &STATIC_CALL_TO_NON_STATIC,
        &CONTEXT_NOT_OBJECT,
        &UNANALYZABLE,
        &GENERIC_CONSTRUCTOR_TYPES,
        &TEMPLATE_TYPE_NOT_DECLARED,
        &SYNTAX_ERROR,
    ];

    /// Look an issue up by its stable type name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Issue> {
        ALL.iter().copied().find(|issue| issue.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for issue in catalog::ALL {
            assert!(seen.insert(issue.id), "duplicate id {}", issue.id);
        }
    }

    #[test]
    fn catalog_names_are_unique_and_prefixed() {
        let mut seen = std::collections::HashSet::new();
        for issue in catalog::ALL {
            assert!(issue.name.starts_with("Phan"), "bad name {}", issue.name);
            assert!(seen.insert(issue.name), "duplicate name {}", issue.name);
        }
    }

    #[test]
    fn format_message_substitutes_positionally() {
        let rendered = format_message(
            "Argument {0} ({1}) is {2} but {3}() takes {4}",
            &["1".into(), "x".into(), "string".into(), "\\f".into(), "int".into()],
        );
        assert_eq!(rendered, "Argument 1 (x) is string but \\f() takes int");
    }

    #[test]
    fn instance_display_matches_plain_format() {
        let instance = IssueInstance::new(
            &catalog::UNDECLARED_EXTENDED_CLASS,
            "src",
            1,
            vec!["\\C".into()],
        );
        assert_eq!(
            instance.to_string(),
            "src:1 PhanUndeclaredExtendedClass Class extends undeclared class \\C"
        );
    }

    #[test]
    fn lookup_by_name() {
        assert!(catalog::by_name("PhanUndeclaredClass").is_some());
        assert!(catalog::by_name("PhanNoSuchIssue").is_none());
    }
}
