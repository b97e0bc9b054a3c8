/// Marker accepted in place of a context name for "whatever is active right now".
pub const CURRENT_CONTEXT_MARKER: &str = ".";

/// Token that swaps back to the previously active context.
pub const SWAP_TOKEN: &str = "-";

/// A context named on the command line, possibly by the `.` marker.
///
/// The marker is kept unresolved until execution so that it always names the
/// context that is active when the operation actually runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRef {
    Current,
    Named(String),
}

impl ContextRef {
    pub fn resolve<'a>(&'a self, current: &'a str) -> &'a str {
        match self {
            Self::Current => current,
            Self::Named(name) => name,
        }
    }
}

impl From<&str> for ContextRef {
    fn from(raw: &str) -> Self {
        if raw == CURRENT_CONTEXT_MARKER {
            Self::Current
        } else {
            Self::Named(raw.to_string())
        }
    }
}

/// The single thing an invocation was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    InteractiveSwitch,
    InteractiveDelete,
    Switch { target: String, namespace: Option<String> },
    SwapBack,
    Delete { names: Vec<String> },
    Rename { new_name: String, old_name: ContextRef },
    Current,
    Unset,
    Help,
    Version,
    Unsupported { reason: String },
}

impl Operation {
    fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported { reason: reason.into() }
    }
}

/// Resolves the process arguments (without the program name) into an [`Operation`].
///
/// `is_interactive` is only consulted when no target was given, to pick between the
/// interactive picker and a plain listing.
pub fn parse_args<S: AsRef<str>>(argv: &[S], is_interactive: impl Fn() -> bool) -> Operation {
    let mut args: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();

    let Some(&first) = args.first() else {
        return interactive_or_list(&is_interactive);
    };

    if first == "-d" {
        if args.len() == 1 {
            return if is_interactive() {
                Operation::InteractiveDelete
            } else {
                Operation::unsupported("'-d' needs arguments")
            };
        }
        return Operation::Delete { names: args[1..].iter().map(|s| s.to_string()).collect() };
    }

    let mut namespace = None;
    if let Some(idx) = args.iter().position(|a| *a == "-n" || *a == "--namespace") {
        let Some(value) = args.get(idx + 1) else {
            return Operation::unsupported("'-n' requires a namespace argument");
        };
        namespace = Some(value.to_string()).filter(|ns| !ns.is_empty());
        args.drain(idx..=idx + 1);
    }

    match args.as_slice() {
        [] if namespace.is_some() => Operation::unsupported("context name is required when using -n flag"),
        [] => interactive_or_list(&is_interactive),
        [token] => classify(token, namespace),
        _ => Operation::unsupported("too many arguments"),
    }
}

fn interactive_or_list(is_interactive: &impl Fn() -> bool) -> Operation {
    if is_interactive() {
        Operation::InteractiveSwitch
    } else {
        Operation::List
    }
}

fn classify(token: &str, namespace: Option<String>) -> Operation {
    match token {
        "--help" | "-h" => return Operation::Help,
        "--version" | "-V" => return Operation::Version,
        "--current" | "-c" => return Operation::Current,
        "--unset" | "-u" => return Operation::Unset,
        _ => {}
    }

    if let Some((new_name, old_name)) = parse_rename(token) {
        return Operation::Rename { new_name, old_name };
    }

    if token == SWAP_TOKEN && namespace.is_none() {
        return Operation::SwapBack;
    }
    if token.starts_with('-') && token != SWAP_TOKEN {
        return Operation::unsupported(format!("unsupported option '{token}'"));
    }
    Operation::Switch { target: token.to_string(), namespace }
}

/// Parses `NEW=OLD`. Exactly one `=` with both sides non-empty.
pub fn parse_rename(token: &str) -> Option<(String, ContextRef)> {
    let (new_name, old_name) = token.split_once('=')?;
    if new_name.is_empty() || old_name.is_empty() || old_name.contains('=') {
        return None;
    }
    Some((new_name.to_string(), ContextRef::from(old_name)))
}
