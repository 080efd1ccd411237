//! Entry-point selection shared by every adapter.
//!
//! A harness calls the user's `solve` through exactly one of a fixed list of
//! candidate strategies. Each candidate is plain data: the parameter slots it
//! fills and the rule that decodes the input into those slots. Adapters only
//! report which `solve` signatures the source declares; picking the strategy
//! happens here, top-down, the same way for every language.

/// Message written by a harness when no candidate fits.
pub const NO_ENTRY_MESSAGE: &str = "Error: no usable solve() entry point. Expected one of \
solve(array, target), solve(array), solve(text) or solve() compatible with the given input";

/// Rule that turns the normalized input into `solve` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    /// `n a1 .. an target`: leading length prefix, array, trailing scalar.
    LengthPrefixedArrayAndTarget,
    /// Whole token stream as an integer array, minus a matching length prefix.
    IntArray,
    /// The raw input text.
    RawText,
    NoInput,
}

/// Parameter slot a candidate fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Array,
    Scalar,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    I32,
    I64,
}

/// Declared kind of one `solve` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    IntArray(Width),
    Int(Width),
    Text,
    /// Untyped parameter (JavaScript, unannotated Python); fits any slot.
    Any,
    /// A declared type no candidate can feed.
    Unsupported,
}

impl ParamKind {
    fn width(self) -> Option<Width> {
        match self {
            ParamKind::IntArray(width) | ParamKind::Int(width) => Some(width),
            _ => None,
        }
    }

    fn fits(self, slot: Slot) -> bool {
        matches!(
            (self, slot),
            (ParamKind::Any, _)
                | (ParamKind::IntArray(_), Slot::Array)
                | (ParamKind::Int(_), Slot::Scalar)
                | (ParamKind::Text, Slot::Text)
        )
    }
}

/// How the harness reaches `solve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// A free function named `solve`.
    Function,
    /// A method on an instance of class `Solution`.
    SolutionMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveSignature {
    pub receiver: Receiver,
    pub params: Vec<ParamKind>,
}

impl SolveSignature {
    pub fn new(receiver: Receiver, params: Vec<ParamKind>) -> Self {
        Self { receiver, params }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCandidate {
    pub slots: &'static [Slot],
    pub decoding: Decoding,
}

/// Candidates in priority order; the first one that fits wins.
pub const ENTRY_CANDIDATES: [EntryCandidate; 4] = [
    EntryCandidate {
        slots: &[Slot::Array, Slot::Scalar],
        decoding: Decoding::LengthPrefixedArrayAndTarget,
    },
    EntryCandidate {
        slots: &[Slot::Array],
        decoding: Decoding::IntArray,
    },
    EntryCandidate {
        slots: &[Slot::Text],
        decoding: Decoding::RawText,
    },
    EntryCandidate {
        slots: &[],
        decoding: Decoding::NoInput,
    },
];

impl EntryCandidate {
    fn accepts(&self, signature: &SolveSignature) -> bool {
        signature.params.len() == self.slots.len()
            && signature
                .params
                .iter()
                .zip(self.slots)
                .all(|(param, slot)| param.fits(*slot))
    }
}

/// The strategy a harness is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPlan {
    pub decoding: Decoding,
    pub signature: SolveSignature,
}

impl EntryPlan {
    /// Declared kind for argument `index`; untyped when out of range.
    pub fn param(&self, index: usize) -> ParamKind {
        self.signature
            .params
            .get(index)
            .copied()
            .unwrap_or(ParamKind::Any)
    }
}

/// What the input looks like to the decoding rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShape {
    integer_tokens: Option<usize>,
    /// Narrowest integer width holding every token.
    widest: Width,
}

impl InputShape {
    pub fn of(input: &str) -> Self {
        let mut count = 0;
        let mut widest = Width::I32;
        for token in input.split_whitespace() {
            let Ok(value) = token.parse::<i64>() else {
                return Self {
                    integer_tokens: None,
                    widest,
                };
            };
            if i32::try_from(value).is_err() {
                widest = Width::I64;
            }
            count += 1;
        }
        Self {
            integer_tokens: Some(count),
            widest,
        }
    }

    /// Declared 32-bit parameters must not receive tokens beyond `i32`.
    fn fits_widths(&self, signature: &SolveSignature) -> bool {
        self.widest == Width::I32
            || signature
                .params
                .iter()
                .all(|param| param.width() != Some(Width::I32))
    }

    fn supports(&self, decoding: Decoding) -> bool {
        match decoding {
            Decoding::LengthPrefixedArrayAndTarget => self.integer_tokens.is_some_and(|n| n >= 2),
            Decoding::IntArray => self.integer_tokens.is_some_and(|n| n >= 1),
            Decoding::RawText | Decoding::NoInput => true,
        }
    }
}

/// Pick the first candidate, in priority order, that both a declared
/// signature and the input can satisfy.
pub fn select_entry(signatures: &[SolveSignature], input: &str) -> Option<EntryPlan> {
    let shape = InputShape::of(input);
    ENTRY_CANDIDATES
        .iter()
        .filter(|candidate| shape.supports(candidate.decoding))
        .find_map(|candidate| {
            signatures
                .iter()
                .find(|signature| candidate.accepts(signature) && shape.fits_widths(signature))
                .map(|signature| EntryPlan {
                    decoding: candidate.decoding,
                    signature: signature.clone(),
                })
        })
}

/// Split a parameter list on top-level commas, ignoring commas nested in
/// generics or brackets.
pub(crate) fn split_params(list: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '<' | '[' | '(' | '{' => {
                depth += 1;
                current.push(c);
            }
            '>' | ']' | ')' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// Declared type of a C-family parameter, without its name or default.
pub(crate) fn typed_param_type(param: &str) -> &str {
    let declaration = param.split('=').next().unwrap_or(param).trim();
    match declaration.rsplit_once(char::is_whitespace) {
        Some((ty, _)) => ty.trim_end(),
        None => declaration,
    }
}

/// Classify a C-family declared type (`int[]`, `vector<long long>&`, `String`).
pub(crate) fn classify_typed(ty: &str) -> ParamKind {
    let ty = ty.replace("const ", "").replace("final ", "");
    let compact: String = ty
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '&')
        .collect();
    let compact = compact.trim_start_matches("std::");

    if let Some(element) = compact.strip_suffix("[]") {
        // Boxed element arrays can't take a primitive array argument
        if matches!(element, "Integer" | "Long") {
            return ParamKind::Unsupported;
        }
        return integral_width(element).map_or(ParamKind::Unsupported, ParamKind::IntArray);
    }
    if let Some(element) = compact
        .strip_prefix("vector<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return integral_width(element.trim_start_matches("std::"))
            .map_or(ParamKind::Unsupported, ParamKind::IntArray);
    }
    if matches!(compact, "string" | "String") {
        return ParamKind::Text;
    }
    integral_width(compact).map_or(ParamKind::Unsupported, ParamKind::Int)
}

fn integral_width(base: &str) -> Option<Width> {
    match base {
        "int" | "Integer" | "int32_t" => Some(Width::I32),
        "long" | "Long" | "longlong" | "longint" | "int64_t" => Some(Width::I64),
        _ => None,
    }
}
