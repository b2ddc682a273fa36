pub mod config;
pub mod key;
pub mod metadata;
pub mod node;
pub mod spec;
pub mod validation_error;

pub use config::{
    ActionConfig, BlockConfig, ControlConfig, ControlType, ExecutableConfig, ExpressionConfig,
    FunctionConfig, OutputConfig, ProcessConfig, ReferenceConfig, ValueConfig,
};
pub use key::ContentKey;
pub use metadata::Metadata;
pub use node::{
    ActionNode, ArgumentNode, BlockNode, ContentKind, ContentNode, ControlNode, FunctionNode,
    NodeKind, ProcessNode, Reachability, ReferenceNode, ValueNode, VariableNode, RETURN_SLOT,
};
pub use spec::{
    CallableSpec, EngineSpec, LiteralFormat, OutputSpec, ParameterSpec, PropertySpec, TypeSpec,
    BOOLEAN_TYPE, OBJECT_TYPE, STRING_TYPE,
};
pub use validation_error::{ValidationCode, ValidationError};
