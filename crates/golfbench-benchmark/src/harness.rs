use golfbench_core::{GolfBenchError, Result};
use serde_json::Value;

/// Test runner prepended to every harness program. The candidate arrives as
/// a string and is only interpreted by `eval`, so its text cannot break the
/// surrounding program.
const TEST_RUNNER_JS: &str = r#"function runTests(functionDefinition, functionName, inputs, expectedOutputs) {
    eval(functionDefinition);
    const func = eval(functionName);
    const results = [];
    let allPassed = true;

    for (let i = 0; i < inputs.length; i++) {
        try {
            const actual = func(inputs[i]);
            const expected = expectedOutputs[i];
            const pass = JSON.stringify(actual) === JSON.stringify(expected);

            if (!pass) {
                allPassed = false;
            }

            results.push({
                index: i,
                pass: pass,
                expected: expected,
                actual: actual,
                input: inputs[i]
            });
        } catch (error) {
            allPassed = false;
            results.push({
                index: i,
                pass: false,
                expected: expectedOutputs[i],
                actual: null,
                input: inputs[i],
                error: error && error.message !== undefined ? error.message : String(error)
            });
        }
    }

    return {
        ok: true,
        pass: allPassed,
        results: results
    };
}"#;

/// Escape text for a double-quoted JavaScript string literal.
///
/// Backslashes are replaced first so the escapes introduced for quotes and
/// control characters are not escaped a second time.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Assemble the program that evaluates one candidate against every case and
/// prints a pretty JSON report as its only output.
pub fn build_harness(
    function_definition: &str,
    function_name: &str,
    inputs: &[Value],
    expected_outputs: &[Value],
) -> Result<String> {
    if inputs.len() != expected_outputs.len() {
        return Err(GolfBenchError::InvalidCandidateSet(format!(
            "{} inputs but {} expected outputs",
            inputs.len(),
            expected_outputs.len()
        )));
    }

    let inputs_js = serde_json::to_string(inputs)?;
    let expected_outputs_js = serde_json::to_string(expected_outputs)?;

    Ok(format!(
        r#"{runner}

const functionDef = "{definition}";
const functionName = "{name}";
const inputs = {inputs};
const expectedOutputs = {expected};

const result = runTests(functionDef, functionName, inputs, expectedOutputs);
console.log(JSON.stringify(result, null, 2));
"#,
        runner = TEST_RUNNER_JS,
        definition = escape_js_string(function_definition),
        name = escape_js_string(function_name),
        inputs = inputs_js,
        expected = expected_outputs_js,
    ))
}
