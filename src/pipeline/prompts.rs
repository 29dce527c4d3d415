//! Prompt text for every generation step.

pub const IMAGE_ANALYSIS: &str = "Analyze this software solution diagram. List all nodes and provide a brief explanation for each. \
Do not use any formatting such as bold, italics, or underline. Use line breaks only. \
Do not include any commentary or justification, only output the node names and their explanations. \
After listing all nodes, provide a single concluding paragraph that offers a holistic view of the entire solution.";

pub fn enhance_explanation(text: &str) -> String {
    format!(
        r"Please enhance the following technical explanation to make it more technical, more professional, and well-structured:

{text}

Your enhanced version should:
1. Maintain all the technical details and be more comprehensive
2. Format the text with proper paragraphs
3. Suggest tools and technologies to use, preferring white-label services
4. Structure it in an 'X then Y' format
5. Make it concise and to the point
6. Never use fluff words, this is a technical document for the engineering team
7. Do not use filler words; if a word is not adding value, remove it"
    )
}

pub fn structure_solution(ai_analysis: &str, explanation: &str) -> String {
    format!(
        r#"I need to structure a technical solution based on the following information:

AI ANALYSIS OF SOLUTION DIAGRAM:
{ai_analysis}

USER'S SOLUTION EXPLANATION:
{explanation}

Please provide the following:

1. A general title that encompasses the solution idea
2. A numbered set of steps based on the solution items (5-10 lines)
3. A short paragraph arguing technically why this approach is good, focusing on hours saved and reusability
4. A difficulty percentage (most projects range from 30% to 70%); each week adds 5% to the difficulty, so a 10 week project would be 50% difficulty
5. Do not default the difficulty to 50%; go higher or lower with the complexity of the solution and avoid multiples of 5

Format your response as JSON with the following structure:
{{
    "title": "Your suggested title",
    "steps": "Numbered steps as text",
    "approach": "Technical justification paragraph",
    "difficulty": 50
}}"#
    )
}

pub fn enhance_structured_content(title: &str, steps: &str, approach: &str) -> String {
    format!(
        r#"Please enhance the following structured content by adding appropriate HTML formatting tags to make it more visually appealing and professional.

IMPORTANT: Only add HTML formatting tags (like <strong>, <em>, <br>, <ul>, <li>) to enhance the presentation. Do NOT change the actual text content, meaning, or structure.

TITLE: {title}

STEPS: {steps}

APPROACH: {approach}

Return the enhanced content as JSON with the following structure:
{{
    "title": "Enhanced title with HTML formatting",
    "steps": "Enhanced steps with HTML formatting",
    "approach": "Enhanced approach with HTML formatting"
}}

Remember: only add HTML formatting tags, do not change the actual text content."#
    )
}

pub const STACK_ANALYSIS_SYSTEM: &str = "You are an expert software architect with deep knowledge of modern development stacks, \
cloud services, and automation tools. Provide detailed, practical recommendations that minimize manual engineering work.";

pub fn stack_analysis(ai_analysis: &str, explanation: &str, image_link: &str) -> String {
    let mut context = Vec::new();
    if !ai_analysis.trim().is_empty() {
        context.push(format!("AI Analysis of the diagram:\n{ai_analysis}"));
    }
    context.push(format!("Solution Explanation:\n{explanation}"));
    if !image_link.trim().is_empty() {
        context.push(format!("Reference diagram available at: {image_link}"));
    }
    let context = context.join("\n\n");

    format!(
        r#"Based on the following solution details, please provide a comprehensive per-node stack analysis:

{context}

Please analyze the solution and provide:

1. List all nodes/components in the architecture
2. For each node, suggest specific stacks, tools, and services that could be utilized
3. Prioritize tools that can handle multiple functions single-handedly to reduce manual engineering work
4. If a tool does all the work, it is the ideal solution; delegate to third parties as much as possible
5. When suggesting white-label solutions, format them as "ToolName (service)" rather than mentioning white-labeling
6. Provide well-researched recommendations

Format the response with:
- Node Name: Re-state the node name
  - Recommended Stack: 3-5 specific tools/services formatted as "ToolName (Tool: www.toolwebsite.com)" or "ServiceName (Service: www.servicewebsite.com)"

Use actual tool names, not generic categories. Do not bold, italicize or underline; line breaks only. Do not write justifications or comments, just the list of tools and services per node."#
    )
}

pub const DIAGRAM_SYSTEM: &str = "You are an expert technical diagram designer with deep knowledge of software architecture visualization, \
UML diagrams, and technical documentation. Provide clear, actionable diagram descriptions.";

pub fn diagram_description(ideation: &str) -> String {
    format!(
        r"Based on the following ideation content, generate a detailed description of how a diagram should be drawn to represent this solution:

IDEATION CONTENT:
{ideation}

Please provide a comprehensive diagram description that includes:

1. ALL NODES: each node/component with its name and purpose, its visual form (sharp square, rounded rectangle, diamond, database cylinder, circle, hexagon) and the text that should appear on it
2. CONNECTIONS: which nodes connect to which, the connection type (solid arrow, dashed arrow, bidirectional arrow, simple line, dotted line) and the direction of data or process flow
3. VISUAL LAYOUT: suggested positioning (top-to-bottom, left-to-right, circular, hierarchical), grouping of related components and any color coding
4. LABELS AND ANNOTATIONS: any additional text, labels, or annotations needed

Include only relevant actionable details. Focus on technical accuracy and clarity."
    )
}

pub const SKETCH_SYSTEM: &str = "You convert diagram descriptions into draw.io (mxGraph) XML. \
Reply with the XML only, no commentary and no Markdown.";

pub fn sketch(planning: &str) -> String {
    format!("Create the diagram described below.\n\n{planning}")
}

pub const SOW_SYSTEM: &str = "You are a senior delivery lead who writes Statements of Work for software consulting projects. \
You always answer with a single JSON object.";

pub fn generate_sow(brief: &str) -> String {
    format!(
        r#"Write a Statement of Work for the project described below.

{brief}

Return a JSON object with exactly these fields:
{{
    "project_purpose_background": "One or two paragraphs on why the project exists",
    "objectives": ["Measurable objective", "..."],
    "in_scope_deliverables": [
        {{"deliverable": "Name", "key_features": "Key features", "primary_artifacts": "Artifacts handed over"}}
    ],
    "out_of_scope": "What is explicitly excluded",
    "functional_requirements": ["Requirement", "..."],
    "non_functional_requirements": ["Requirement", "..."],
    "project_phases_timeline": {{
        "phases": [
            {{"phase": "Phase name", "key_activities": "Activities", "weeks_start": 0, "weeks_end": 2}}
        ]
    }}
}}

Weeks are integers; phases may overlap. Do not repeat the client or project names as separate fields."#
    )
}

pub const LOE_SYSTEM: &str = "You are a senior delivery lead who estimates consulting engagements. \
You always answer with a single JSON object.";

pub fn generate_loe(brief: &str) -> String {
    format!(
        r#"Estimate the Level of Effort for the Statement of Work below. One person-week is 20 person-hours.

{brief}

Return a JSON object with exactly these fields:
{{
    "overview": "Short summary of the estimate",
    "workstreams": [{{"workstream": "Name", "activities": "Key activities", "duration": 3}}],
    "resources": [{{"role": "Role", "personWeeks": 4, "personHours": 80}}],
    "buffer": {{"weeks": 1, "hours": 20}},
    "assumptions": ["Assumption", "..."],
    "goodOptions": [{{"feature": "Feature removed to reduce effort", "hours": 40, "weeks": 2}}],
    "bestOptions": [{{"feature": "Feature added to extend value", "hours": 60, "weeks": 3}}]
}}"#
    )
}

pub const PAIN_POINTS_SYSTEM: &str = "You are a solutions consultant analyzing discovery material. \
You always answer with a single JSON object.";

pub fn analyze_pain_points(transcript: &str) -> String {
    format!(
        r#"Analyze the discovery content below and identify the client's pain points.

{transcript}

Return a JSON object:
{{
    "report": "Narrative analysis of the situation and its root causes",
    "pain_points": ["Pain point", "..."]
}}"#
    )
}

pub const SOLUTION_SYSTEM: &str = "You are a solutions architect designing remedies for client pain points. \
You always answer with a single JSON object.";

pub fn generate_solution(pain_points: &str, content: &str, report: &str) -> String {
    format!(
        r#"Design a solution for the pain points below.

PAIN POINTS:
{pain_points}

CONTEXT:
{content}

ANALYSIS REPORT:
{report}

Return a JSON object:
{{
    "overview": "HTML overview of the overall solution",
    "solution_parts": ["One part of the solution", "..."]
}}"#
    )
}

pub const QUICKSHOT_SYSTEM: &str = "You are Nexa's Quickshot AI, an instant-response assistant for PDF document editing. \
You acknowledge requests with energy, decide whether the document must change and always answer with a single JSON object.";

pub fn quickshot(summary: &str, older_messages: &str, input: &str) -> String {
    format!(
        r#"SUMMARY: {summary}
(SUMMARY ENDS HERE)

OLDER MESSAGES: {older_messages}
(OLDER MESSAGES END HERE)

NEW MESSAGE: {input}

Decide whether the user wants the document changed:
- maestro = true when they ask for changes to text, styling or layout
- maestro = false when they are chatting, asking questions or explaining

Return exactly this JSON:
{{
    "maestro": true,
    "message_to_maestro": "Simple edit instruction when maestro is true, otherwise null",
    "chat_responses": [
        "Immediate acknowledgment",
        "What you are doing",
        "Progress update",
        "Final confirmation"
    ]
}}

Rules:
- chat_responses holds 2 to 4 messages, each under 100 characters
- Never say you cannot do something
- When maestro is true, focus on the value of the change"#
    )
}

pub const MAESTRO_SYSTEM: &str = "You are Nexa's Canvas Maestro, an expert document modification AI. \
You modify HTML documents precisely while preserving their structure and styling, and always answer with a single JSON object.";

pub fn maestro(summary: &str, older_messages: &str, template: &str, instruction: &str) -> String {
    format!(
        r#"SUMMARY: {summary}
(SUMMARY ENDS HERE)

OLDER MESSAGES: {older_messages}
(OLDER MESSAGES END HERE)

CURRENT TEMPLATE: {template}
(CURRENT TEMPLATE ENDS HERE)

MODIFICATION INSTRUCTION: {instruction}

Apply the instruction to the template in the context of the conversation.
- Preserve all CSS, layout and document hierarchy
- Keep the HTML complete and well-formed
- Escape quotes and backslashes so the JSON stays valid

Return exactly this JSON:
{{
    "modified_template": "Complete HTML document with the changes applied",
    "explanation": "One or two sentences describing the changes"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_analysis_skips_empty_context() {
        let prompt = stack_analysis("  ", "Ingest then score", "");
        assert!(!prompt.contains("AI Analysis of the diagram"));
        assert!(!prompt.contains("Reference diagram"));
        assert!(prompt.contains("Solution Explanation:\nIngest then score"));
    }

    #[test]
    fn test_structure_prompt_embeds_inputs() {
        let prompt = structure_solution("Node A", "Explain");
        assert!(prompt.contains("Node A"));
        assert!(prompt.contains("\"difficulty\": 50"));
    }
}
