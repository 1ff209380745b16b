//! Built-in node kinds and their socket-resolution functions.
//!
//! Every function here is pure in `(context, config)`: no mutation, no
//! mounting, no caching. Unknown function references resolve to the
//! wildcard type with a degraded marker; unknown variables degrade to the
//! wildcard silently.

use crate::config::{
    decode_or_default, ControlConfig, ControlMode, FunctionDefineConfig, FunctionRefConfig,
    PackConfig, VariableConfig,
};
use crate::context::SocketContext;
use crate::kind::NodeKindSpec;
use crate::socket::{socket_ids, DegradedReason, Socket, SocketLayout};
use serde_json::Value;
use vscript_core::types::ValueType;

/// Kind identifiers for the built-in node set.
pub mod kind_ids {
    pub const VARIABLE_GET: &str = "variable/get";
    pub const VARIABLE_SET: &str = "variable/set";
    pub const FUNCTION_DEFINE: &str = "function/define";
    pub const FUNCTION_CALL: &str = "function/call";
    pub const FUNCTION_RETURN: &str = "function/return";
    pub const BRANCH: &str = "control/branch";
    pub const LOOP: &str = "control/loop";
    pub const PACK: &str = "data/pack";
}

/// The built-in kind table, in palette order.
pub fn builtin_kinds() -> Vec<NodeKindSpec> {
    vec![
        NodeKindSpec {
            id: kind_ids::VARIABLE_GET,
            label: "Get Variable",
            category: "Variables",
            compute_sockets: variable_get,
        },
        NodeKindSpec {
            id: kind_ids::VARIABLE_SET,
            label: "Set Variable",
            category: "Variables",
            compute_sockets: variable_set,
        },
        NodeKindSpec {
            id: kind_ids::FUNCTION_DEFINE,
            label: "Function",
            category: "Functions",
            compute_sockets: function_define,
        },
        NodeKindSpec {
            id: kind_ids::FUNCTION_CALL,
            label: "Call Function",
            category: "Functions",
            compute_sockets: function_call,
        },
        NodeKindSpec {
            id: kind_ids::FUNCTION_RETURN,
            label: "Return",
            category: "Functions",
            compute_sockets: function_return,
        },
        NodeKindSpec {
            id: kind_ids::BRANCH,
            label: "Branch",
            category: "Control",
            compute_sockets: branch,
        },
        NodeKindSpec {
            id: kind_ids::LOOP,
            label: "Loop",
            category: "Control",
            compute_sockets: control_loop,
        },
        NodeKindSpec {
            id: kind_ids::PACK,
            label: "Pack",
            category: "Data",
            compute_sockets: pack,
        },
    ]
}

fn with_config_state(layout: SocketLayout, err: Option<crate::config::ConfigError>) -> SocketLayout {
    match err {
        Some(err) => layout.degraded(DegradedReason::InvalidConfig(err)),
        None => layout,
    }
}

// ============================================================================
// Variables
// ============================================================================

/// `variable/get`: a pure data read. The output takes the variable's
/// declared type; an unknown or unnamed variable degrades silently to the
/// wildcard, per the lookup-miss policy.
fn variable_get(ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<VariableConfig>(config);
    let ty = ctx
        .variable(&config.name)
        .map(|var| var.ty)
        .unwrap_or(ValueType::Any);
    let label = if config.name.is_empty() {
        "value".to_string()
    } else {
        config.name.clone()
    };
    with_config_state(
        SocketLayout::new(vec![], vec![Socket::new(socket_ids::VALUE, label, ty)]),
        err,
    )
}

/// `variable/set`: flow-through write. The value input takes the declared
/// type when the variable is known, and the wildcard otherwise, in which
/// case the connected upstream type refines the label.
fn variable_set(ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<VariableConfig>(config);
    let ty = ctx
        .variable(&config.name)
        .map(|var| var.ty)
        .unwrap_or(ValueType::Any);
    let label = ctx.refined_label(socket_ids::VALUE, "value", ty);
    with_config_state(
        SocketLayout::new(
            vec![
                Socket::flow(socket_ids::PREV, "prev"),
                Socket::new(socket_ids::VALUE, label, ty),
            ],
            vec![Socket::flow(socket_ids::NEXT, "next")],
        ),
        err,
    )
}

// ============================================================================
// Functions
// ============================================================================

fn param_socket_id(index: usize) -> String {
    format!("param{index}")
}

/// `function/define`: declares a signature. Outputs are the body's entry
/// flow plus one data socket per declared parameter, so the parameter list
/// in the config directly drives socket arity.
fn function_define(_ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<FunctionDefineConfig>(config);
    let mut outputs = vec![Socket::flow(socket_ids::BODY, "body")];
    for (index, param) in config.params.iter().enumerate() {
        let label = if param.name.is_empty() {
            format!("arg{index}")
        } else {
            param.name.clone()
        };
        outputs.push(Socket::new(param_socket_id(index), label, param.ty));
    }
    with_config_state(SocketLayout::new(vec![], outputs), err)
}

/// `function/call`: sockets come from the callee's declared signature,
/// resolved by name at descriptor time. A dangling callee still yields a
/// usable layout (flow in, flow out, wildcard result) plus a persistent
/// degraded marker until the user repoints the node.
fn function_call(ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<FunctionRefConfig>(config);

    if config.function.is_empty() {
        let layout = SocketLayout::new(
            vec![Socket::flow(socket_ids::PREV, "prev")],
            vec![
                Socket::flow(socket_ids::NEXT, "next"),
                Socket::new(socket_ids::RESULT, "result", ValueType::Any),
            ],
        );
        return with_config_state(layout, err).degraded(DegradedReason::CalleeUnset);
    }

    let Some(callee) = ctx.function(&config.function) else {
        let layout = SocketLayout::new(
            vec![Socket::flow(socket_ids::PREV, "prev")],
            vec![
                Socket::flow(socket_ids::NEXT, "next"),
                Socket::new(socket_ids::RESULT, "result", ValueType::Any),
            ],
        );
        return with_config_state(layout, err)
            .degraded(DegradedReason::UnknownFunction(config.function));
    };

    let mut inputs = vec![Socket::flow(socket_ids::PREV, "prev")];
    for (index, param) in callee.params.iter().enumerate() {
        let id = param_socket_id(index);
        let label = ctx.refined_label(&id, &param.name, param.ty);
        inputs.push(Socket::new(id, label, param.ty));
    }

    let mut outputs = vec![Socket::flow(socket_ids::NEXT, "next")];
    if callee.return_ty != ValueType::Nil {
        outputs.push(Socket::new(
            socket_ids::RESULT,
            "result",
            callee.return_ty,
        ));
    }
    with_config_state(SocketLayout::new(inputs, outputs), err)
}

/// `function/return`: hands a value back from inside a function body. The
/// value input takes the owning function's declared return type; functions
/// returning `nil` take no value at all.
fn function_return(ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<FunctionRefConfig>(config);
    let mut inputs = vec![Socket::flow(socket_ids::PREV, "prev")];

    match ctx.function(&config.function) {
        Some(owner) => {
            if owner.return_ty != ValueType::Nil {
                inputs.push(Socket::new(socket_ids::VALUE, "value", owner.return_ty));
            }
            with_config_state(SocketLayout::new(inputs, vec![]), err)
        }
        None => {
            inputs.push(Socket::new(socket_ids::VALUE, "value", ValueType::Any));
            let reason = if config.function.is_empty() {
                DegradedReason::CalleeUnset
            } else {
                DegradedReason::UnknownFunction(config.function)
            };
            with_config_state(SocketLayout::new(inputs, vec![]), err).degraded(reason)
        }
    }
}

// ============================================================================
// Control flow
// ============================================================================

/// `control/branch`: two-way split. Linear mode wires the condition in as a
/// boolean socket; expression mode embeds it as text and drops the socket.
/// Outputs are identical in both modes.
fn branch(_ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<ControlConfig>(config);
    let mut inputs = vec![Socket::flow(socket_ids::PREV, "prev")];
    let outputs = vec![
        Socket::flow("then", "then"),
        Socket::flow("else", "else"),
    ];

    match config.mode {
        ControlMode::Linear => {
            inputs.push(Socket::new(
                socket_ids::CONDITION,
                "condition",
                ValueType::Boolean,
            ));
            with_config_state(SocketLayout::new(inputs, outputs), err)
        }
        ControlMode::Expression => {
            let layout = SocketLayout::new(inputs, outputs);
            if config.expression.trim().is_empty() {
                with_config_state(layout, err).degraded(DegradedReason::EmptyExpression)
            } else {
                with_config_state(layout, err)
            }
        }
    }
}

/// `control/loop`: numeric range in linear mode (`from`/`to`/`step` wired
/// in), free-form iterator text in expression mode. The body/next flow
/// outputs and the numeric index are the same in both modes.
fn control_loop(_ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<ControlConfig>(config);
    let mut inputs = vec![Socket::flow(socket_ids::PREV, "prev")];
    let outputs = vec![
        Socket::flow(socket_ids::BODY, "body"),
        Socket::flow(socket_ids::NEXT, "next"),
        Socket::new("index", "index", ValueType::Number),
    ];

    match config.mode {
        ControlMode::Linear => {
            inputs.push(Socket::new("from", "from", ValueType::Number));
            inputs.push(Socket::new("to", "to", ValueType::Number));
            inputs.push(Socket::new("step", "step", ValueType::Number));
            with_config_state(SocketLayout::new(inputs, outputs), err)
        }
        ControlMode::Expression => {
            let layout = SocketLayout::new(inputs, outputs);
            if config.expression.trim().is_empty() {
                with_config_state(layout, err).degraded(DegradedReason::EmptyExpression)
            } else {
                with_config_state(layout, err)
            }
        }
    }
}

// ============================================================================
// Data
// ============================================================================

/// `data/pack`: collects N wildcard elements into a table. The element count
/// in the config drives input arity; connected upstream types refine the
/// element labels.
fn pack(ctx: &SocketContext<'_>, config: &Value) -> SocketLayout {
    let (config, err) = decode_or_default::<PackConfig>(config);
    let mut inputs = Vec::with_capacity(config.count as usize);
    for index in 0..config.count {
        let id = format!("item{index}");
        let label = ctx.refined_label(&id, &format!("item {index}"), ValueType::Any);
        inputs.push(Socket::new(id, label, ValueType::Any));
    }
    with_config_state(
        SocketLayout::new(
            inputs,
            vec![Socket::new(socket_ids::VALUE, "value", ValueType::Table)],
        ),
        err,
    )
}
