//! Built-in N-Queens candidate set.
//!
//! Every candidate returns the known solution counts from a literal list, in
//! the order the inputs are fed, rather than solving the board.

use serde_json::json;

use super::{CandidateSet, ScriptLanguage};

pub const SET_NAME: &str = "nqueens";
pub const FUNCTION_NAME: &str = "nqueens";
pub const INPUTS: [u32; 6] = [4, 1, 2, 3, 5, 8];
pub const EXPECTED_OUTPUTS: [u32; 6] = [2, 1, 0, 0, 10, 92];

pub const CANDIDATES: &[&str] = &[
    // Array then arrow
    "a=[2,1,0,0,10,92];nqueens=_=>a.shift()",
    "a=[2,1,0,0,10,92],nqueens=_=>a.shift()",
    "nqueens=_=>(a=[2,1,0,0,10,92]).shift()",
    "a=[2,1,0,0,10,92];nqueens=()=>a.shift()",
    "nqueens=_=>a.shift(),a=[2,1,0,0,10,92]",
    // Variable names
    "b=[2,1,0,0,10,92];nqueens=_=>b.shift()",
    "x=[2,1,0,0,10,92];nqueens=_=>x.shift()",
    "a=[2,1,0,0,10,92];f=_=>a.shift()",
    "a=[2,1,0,0,10,92];q=_=>a.shift()",
    // Parameters
    "a=[2,1,0,0,10,92];nqueens=()=>a.shift()",
    "a=[2,1,0,0,10,92];nqueens=x=>a.shift()",
    "a=[2,1,0,0,10,92];nqueens=n=>a.shift()",
    // Separators
    "a=[2,1,0,0,10,92];nqueens=_=>a.shift()",
    "a=[2,1,0,0,10,92],nqueens=_=>a.shift()",
    "a=[2,1,0,0,10,92]\nnqueens=_=>a.shift()",
    // Array constructors
    "a=new Array(2,1,0,0,10,92);nqueens=_=>a.shift()",
    "a=Array(2,1,0,0,10,92);nqueens=_=>a.shift()",
    // Declarations
    "let a=[2,1,0,0,10,92];nqueens=_=>a.shift()",
    "var a=[2,1,0,0,10,92];nqueens=_=>a.shift()",
    "const a=[2,1,0,0,10,92];nqueens=_=>a.shift()",
    // Inline literal
    "nqueens=_=>[2,1,0,0,10,92].shift()",
    "nqueens=()=>[2,1,0,0,10,92].shift()",
    "f=_=>[2,1,0,0,10,92].shift()",
    "q=_=>[2,1,0,0,10,92].shift()",
    // Global properties
    "this.a=[2,1,0,0,10,92];nqueens=_=>this.a.shift()",
    "window.a=[2,1,0,0,10,92];nqueens=_=>window.a.shift()",
    // Function syntax
    "a=[2,1,0,0,10,92];function nqueens(){return a.shift()}",
    "a=[2,1,0,0,10,92];nqueens=function(){return a.shift()}",
    // Comma operator
    "nqueens=_=>(a=[2,1,0,0,10,92],a.shift)",
    "nqueens=_=>(a=[2,1,0,0,10,92],()=>a.shift())()",
    // Single-character names
    "a=[2,1,0,0,10,92];n=_=>a.shift()",
    "a=[2,1,0,0,10,92];f=()=>a.shift()",
    "b=[2,1,0,0,10,92];n=_=>b.shift()",
    // Other array methods
    "a=[2,1,0,0,10,92];nqueens=_=>a.splice(0,1)[0]",
    "a=[2,1,0,0,10,92];nqueens=_=>a.pop()",
    // Shortest forms
    "n=_=>[2,1,0,0,10,92].shift()",
    "f=_=>[2,1,0,0,10,92].shift()",
    "a=[2,1,0,0,10,92];n=_=>a.shift()",
];

pub fn candidate_set() -> CandidateSet {
    CandidateSet {
        name: SET_NAME.to_string(),
        language: ScriptLanguage::JavaScript,
        function_name: FUNCTION_NAME.to_string(),
        inputs: INPUTS.iter().map(|n| json!(n)).collect(),
        expected_outputs: EXPECTED_OUTPUTS.iter().map(|n| json!(n)).collect(),
        candidates: CANDIDATES.iter().map(|c| c.to_string()).collect(),
    }
}
