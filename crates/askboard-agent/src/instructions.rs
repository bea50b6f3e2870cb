//! Instruction templates
//!
//! Builders for the fixed instruction frames sent to the analytic agent.
//! The query frame pins the structured output contract the pipeline parses;
//! the planner frames rewrite an ambiguous query into a more constrained
//! instruction; the graph frame requests chart recommendations over a
//! tabular answer.

/// Fallback message the query frame instructs the agent to return when the
/// data cannot support the analysis.
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Please review and modify the prompt with more specifics.";

/// Build the query instruction for a user prompt
///
/// Pins the agent to a JSON `{message, table}` payload: empty table plus a
/// fixed message when the data is insufficient, a columns/data table when
/// the answer is tabular, a message list when it is textual. Requires plain
/// decimal formatting and zero-substitution for missing values.
#[must_use]
pub fn query_instruction(prompt: &str) -> String {
    format!(
        r#"Perform the following steps to address the given query:
Step 1: Verify that the provided data and instructions contain sufficient information for the required analysis. If details are insufficient, respond with:
```json
{{
  "table": {{}},
  "message": ["{INSUFFICIENT_DATA_MESSAGE}"]
}}
```
Step 2: If the query requires creating a table, ensure the number of columns always matches the number of values in each data row, and format your response using the following structure:
```json
{{
  "table": {{
    "columns": ["column1", "column2", ...],
    "data": [[value1, value2, ...], [value1, value2, ...], ...]
  }},
  "message": []
}}
```
Step 3: For queries requiring solely a textual response, use the following format:
```json
{{
  "table": {{}},
  "message": ["Your text response here"]
}}
```
Step 4: Use standard decimal format without scientific notation. Replace any missing values with 0.0.
Always return output in JSON format from steps 1 to 3.
Query: {prompt}"#
    )
}

/// Build the planner instruction used to replan an ambiguous query
///
/// Rewrites the query as analysis guidance over the tabular data itself:
/// no code artifacts, no library or data-loading steps, output re-confirmed
/// as text or a tabular result.
#[must_use]
pub fn planner_instruction(prompt: &str) -> String {
    format!(
        "Enhance the instructions for analyzing the tabular data without providing specific code. \
Remove any steps associated with importing libraries or loading data. \
Note: present the output in either text or tabular format. \
User input prompt: {prompt}"
    )
}

/// Planner instruction variant carrying a markdown preview of the data
///
/// Gives the agent the column shapes to anchor the rewrite against.
#[must_use]
pub fn planner_instruction_with_preview(prompt: &str, preview: &str) -> String {
    format!(
        "Enhance the instructions for analyzing the tabular data without including specific code. \
When revising the instructions, consider the columns shown in the data preview. \
Exclude steps related to importing libraries or loading data. \
User input prompt: {prompt}\nHere is the data:\n{preview}"
    )
}

/// Build the graph instruction for a tabular answer
///
/// Requests bar, pie, and line chart recommendations as a strict JSON
/// payload, with an insight string per chart. The caller appends nothing;
/// the rendered table travels inside the instruction.
#[must_use]
pub fn graph_instruction(table_markdown: &str) -> String {
    format!(
        r#"Using exclusively the dataset's existing data, generate visually clear and intuitive chart recommendations that effectively convey insights. Ensure the resulting JSON structure adheres to the format demonstrated in the example below:
```json
{{
  "charts": [
    {{
      "chart_type": "bar",
      "data_format": {{
        "labels": ["Label1", "Label2"],
        "categories": ["Category1", "Category2"],
        "values": [[11.0, 12.0], [21.0, 22.0]],
        "isStacked": true
      }},
      "insight": ["Insight1"]
    }},
    {{
      "chart_type": "pie",
      "data_format": {{
        "labels": ["Label1", "Label2"],
        "categories": ["Category1"],
        "values": [1.0, 2.0],
        "isStacked": false
      }},
      "insight": ["Insight1"]
    }},
    {{
      "chart_type": "line",
      "data_format": {{
        "labels": ["Label1", "Label2"],
        "categories": ["Category1", "Category2"],
        "values": [[11.0, 12.0], [21.0, 22.0]],
        "isStacked": false
      }},
      "insight": ["Insight1"]
    }}
  ]
}}
```
Here is the data:
{table_markdown}"#
    )
}

/// Build the instruction requesting follow-up insight questions
///
/// The agent answers with a JSON array of question strings.
#[must_use]
pub fn insight_questions_instruction(table_markdown: &str) -> String {
    format!(
        "Based on the provided data, generate questions related to insights, \
recommendations, and optimization. Return the questions as a JSON array of strings. \
Here is the data:\n{table_markdown}"
    )
}
