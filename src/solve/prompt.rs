//! Prompt builder for the four-approach solution contract.
//!
//! [`PromptBuilder`] turns a [`ProblemQuery`] into a [`GenerationRequest`]:
//! the instruction text sent to the backend plus the response schema the
//! backend is asked to constrain its output to.  The builder is pure; the
//! same query always yields the same request.

use serde_json::{json, Value};

use crate::solve::model::{ApproachType, ProblemQuery, SOLUTION_COUNT};

// ---------------------------------------------------------------------------
// Instruction text
// ---------------------------------------------------------------------------

const ROLE_INSTRUCTION: &str =
    "You are a senior Data Structures & Algorithms instructor and technical interviewer.";

/// Output rules.  `{language}` is substituted per request; the approach list
/// in rule 1 is rendered from [`ApproachType::ORDER`].
const STRICT_RULES: &str = "\
2. snippet: Clean, executable {language} code. Do NOT embed explanatory comments in the code.
3. lineExplanations: Provide an array of strings, one explanation for each line of code in the snippet. Each explanation must be beginner-friendly, clear, and correspond exactly to the line at the same index in the snippet. Do NOT skip lines.
4. theory:
   - Must be structured in numbered steps (Step 1, Step 2, ...).
   - Each step on a new line.
   - Include the reasoning behind each step.
   - Include small examples or illustrations to clarify concepts.
   - Compare briefly to the previous approach where relevant.
   - Do NOT merge all steps into a single paragraph.
5. audioText: Long, conversational, explaining the intuition and the solution step by step.
6. complexity: Clearly state Time and Space Complexity with an explanation of the dominant factors.";

const OUTPUT_RULE: &str = "\
Return ONLY valid JSON matching the schema provided.
Do NOT include markdown, backticks, or extra keys.";

/// Fields every solution object must carry, in schema order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "title",
    "approachType",
    "snippet",
    "theory",
    "complexity",
    "lineExplanations",
    "audioText",
];

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Everything a [`GenerationClient`](crate::solve::GenerationClient) needs
/// for one structured-output call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full instruction text (single user turn).
    pub instruction: String,
    /// Backend response schema descriptor.
    pub schema: Value,
    /// Sampling temperature.
    pub temperature: f32,
}

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds solution-generation requests.
///
/// # Example
/// ```rust
/// use algo_solver::solve::{ProblemQuery, PromptBuilder};
///
/// let builder = PromptBuilder::new(0.7);
/// let query = ProblemQuery::new("Two Sum", Some("Java")).unwrap();
/// let request = builder.build(&query);
/// assert!(request.instruction.contains("Two Sum"));
/// assert!(request.instruction.contains("Java"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    temperature: f32,
}

impl PromptBuilder {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    /// Build the instruction text and schema for `query`.
    pub fn build(&self, query: &ProblemQuery) -> GenerationRequest {
        GenerationRequest {
            instruction: self.instruction(query),
            schema: response_schema(),
            temperature: self.temperature,
        }
    }

    /// Render the instruction text.
    ///
    /// Structure (in order):
    /// 1. Role line
    /// 2. Problem statement + target language
    /// 3. Strict rules (approach order, snippet, lineExplanations, theory,
    ///    audioText, complexity)
    /// 4. JSON-only output rule
    pub fn instruction(&self, query: &ProblemQuery) -> String {
        let language = query.target_language();
        let mut prompt = String::with_capacity(2048);

        prompt.push_str(ROLE_INSTRUCTION);
        prompt.push_str(&format!(
            "\n\nSolve the problem: \"{}\" using {}.\n\nSTRICT RULES:\n",
            query.text(),
            language
        ));
        prompt.push_str(&approach_rule());
        prompt.push('\n');
        prompt.push_str(&STRICT_RULES.replace("{language}", language));
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_RULE);
        prompt.push('\n');
        prompt
    }
}

/// Rule 1: exactly four approaches, in order, with their `approachType` values.
fn approach_rule() -> String {
    let names: Vec<&str> = ApproachType::ORDER.iter().map(ApproachType::label).collect();
    let tags: Vec<String> = ApproachType::ORDER
        .iter()
        .map(|a| format!("\"{a:?}\""))
        .collect();
    format!(
        "1. Provide EXACTLY {SOLUTION_COUNT} approaches in this order: {}. \
         Set approachType to {} respectively.",
        names.join(", "),
        tags.join(", ")
    )
}

/// Response schema in the backend's OpenAPI-subset dialect.
///
/// `solutions` is pinned to exactly four items and every item requires all
/// of [`REQUIRED_FIELDS`].
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "solutions": {
                "type": "ARRAY",
                "minItems": SOLUTION_COUNT,
                "maxItems": SOLUTION_COUNT,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "approachType": {
                            "type": "STRING",
                            "enum": ["BruteForce", "TimeOptimized", "SpaceOptimized", "Ideal"]
                        },
                        "snippet": { "type": "STRING" },
                        "theory": { "type": "STRING" },
                        "complexity": { "type": "STRING" },
                        "lineExplanations": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Line-for-line explanation for hover feature"
                        },
                        "audioText": { "type": "STRING" }
                    },
                    "required": REQUIRED_FIELDS
                }
            }
        },
        "required": ["solutions"]
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
