//! 提示词构建 - 业务能力层
//!
//! 纯函数，没有副作用；生成循环只把产出的字符串当不透明输入用。
//! 提示词本身是英文，因为目标模型生成的是英文考题

use crate::models::question::Difficulty;

/// 文本生成的系统指令
const SYSTEM_PROMPT: &str = "You are an expert question writer for high-stakes technical examinations in engineering and science. Your task is to generate multiple-choice questions (MCQs) that are:

1. **Technically accurate** and based on well-established concepts
2. **Clear and unambiguous** in wording
3. **Appropriately challenging** for the specified difficulty level
4. **Educational** with detailed explanations that teach the concept
5. **Well-referenced** with credible sources (textbooks, academic websites)

You must follow the exact JSON format specified and ensure all questions have exactly 4 options with only one correct answer.";

/// 难度定义，原样写进提示词
const DIFFICULTY_DEFINITIONS: &str = "**Difficulty Level Definitions:**

1. **Easy**:
   - Direct recall of definitions, formulas, or basic facts
   - Requires minimal reasoning or calculation
   - Single-step problems

2. **Medium**:
   - Application of concepts or formulas to solve problems
   - Requires 1-2 steps of reasoning or calculation
   - May combine 2 related concepts

3. **Hard**:
   - Multi-step reasoning or complex problem-solving
   - Combines multiple concepts from different topics
   - Requires deep understanding and analysis";

/// 多模态生成的系统指令
const MULTIMODAL_SYSTEM_PROMPT: &str = "You are an expert question writer for technical examinations in engineering and science. You have been provided with one or more diagrams, graphs, or formula images along with contextual text.

Your task is to generate multiple-choice questions (MCQs) that:

1. **Require the diagram/image** to answer correctly - the question should NOT be answerable from text alone
2. **Test visual understanding** - interpreting graphs, reading diagrams, analyzing formulas shown in the image
3. **Are technically accurate** based on the diagram and context provided
4. **Match the specified difficulty level**
5. **Include detailed explanations** that reference specific elements of the diagram

IMPORTANT: The question must explicitly require looking at the provided image(s).";

/// few-shot 示例
struct FewShotExample {
    difficulty: Difficulty,
    subtopic: &'static str,
    example: &'static str,
}

const FEW_SHOT_EXAMPLES: [FewShotExample; 3] = [
    FewShotExample {
        difficulty: Difficulty::Easy,
        subtopic: "Linear Algebra - Matrices and Determinants",
        example: r#"{
  "question_text_en": "What is the determinant of a 2×2 identity matrix?",
  "option_a_en": "0",
  "option_b_en": "1",
  "option_c_en": "2",
  "option_d_en": "-1",
  "correct_answer": "B",
  "explanation": "The determinant of an identity matrix of any size is always 1. For a 2×2 identity matrix I = [[1,0],[0,1]], det(I) = (1×1) - (0×0) = 1. This is a fundamental property: the identity matrix represents no scaling or rotation, hence determinant = 1.",
  "references": [
    "https://en.wikipedia.org/wiki/Determinant",
    "Linear Algebra and Its Applications by Gilbert Strang, Chapter 5, Section 5.1"
  ]
}"#,
    },
    FewShotExample {
        difficulty: Difficulty::Medium,
        subtopic: "Crystal Structure - Crystal Systems",
        example: r#"{
  "question_text_en": "A metal crystallizes in a face-centered cubic (FCC) structure. What is the coordination number of each atom?",
  "option_a_en": "6",
  "option_b_en": "8",
  "option_c_en": "12",
  "option_d_en": "4",
  "correct_answer": "C",
  "explanation": "In an FCC structure, each atom is surrounded by 12 nearest neighbors: 4 atoms in the plane above, 4 in the same plane (at face centers), and 4 in the plane below. This gives FCC its high packing efficiency of 74%. Common FCC metals include aluminum, copper, and gold.",
  "references": [
    "https://en.wikipedia.org/wiki/Cubic_crystal_system#Face-centered_cubic",
    "Materials Science and Engineering: An Introduction by William D. Callister, Chapter 3"
  ]
}"#,
    },
    FewShotExample {
        difficulty: Difficulty::Hard,
        subtopic: "Phase Diagrams - Iron-Carbon Diagram",
        example: r#"{
  "question_text_en": "A steel sample containing 0.8% carbon is slowly cooled from 1000°C to room temperature. At approximately what temperature will it undergo the eutectoid transformation?",
  "option_a_en": "1147°C",
  "option_b_en": "912°C",
  "option_c_en": "727°C",
  "option_d_en": "600°C",
  "correct_answer": "C",
  "explanation": "The eutectoid transformation in the Fe-C system occurs at 727°C when austenite transforms into pearlite (a mixture of ferrite and cementite). This is a critical temperature in steel heat treatment. The composition with 0.8% C is the eutectoid composition, meaning it will transform entirely to pearlite at this single temperature.",
  "references": [
    "https://en.wikipedia.org/wiki/Iron%E2%80%93carbon_phase_diagram",
    "Phase Diagrams in Metallurgy by F.N. Rhines, Chapter 4"
  ]
}"#,
    },
];

/// 输出格式说明（两种提示词共用）
fn output_format_block(num_questions: usize) -> String {
    format!(
        r#"**Output Format:**
Respond with a JSON array containing {num} question object(s).
Each object must have these exact keys:
```json
[
  {{
    "question_text_en": "Your question here?",
    "option_a_en": "First option",
    "option_b_en": "Second option",
    "option_c_en": "Third option",
    "option_d_en": "Fourth option",
    "correct_answer": "A",
    "explanation": "Detailed explanation of the correct answer and concept...",
    "references": [
      "https://example.com/source1",
      "Textbook Name by Author, Chapter X, Section Y"
    ]
  }}
]
```

**Important:**
- Output ONLY the JSON array, no additional text
- Ensure valid JSON syntax (use double quotes, escape special characters)
- All text must be in English
- Verify that the correct_answer letter matches the actual correct option"#,
        num = num_questions
    )
}

/// 按目标难度挑选 few-shot 示例
///
/// Easy 给简单示例，Medium 给简单+中等，Hard 给中等+困难
fn select_relevant_examples(difficulty: Difficulty) -> Vec<&'static FewShotExample> {
    let wanted: [Difficulty; 2] = match difficulty {
        Difficulty::Easy => [Difficulty::Easy, Difficulty::Easy],
        Difficulty::Medium => [Difficulty::Easy, Difficulty::Medium],
        Difficulty::Hard => [Difficulty::Medium, Difficulty::Hard],
    };

    let mut selected: Vec<&'static FewShotExample> = Vec::new();
    for level in wanted {
        if let Some(ex) = FEW_SHOT_EXAMPLES
            .iter()
            .find(|ex| ex.difficulty == level && !selected.iter().any(|s| std::ptr::eq(*s, *ex)))
        {
            selected.push(ex);
        }
    }
    selected
}

fn difficulty_hint(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Direct recall, definitions, basic facts. Single-step reasoning.",
        Difficulty::Medium => {
            "Application of concepts, 1-2 step problems, combining related concepts."
        }
        Difficulty::Hard => {
            "Multi-step reasoning, complex problems, combining multiple concepts, analysis or proof."
        }
    }
}

/// 构建文本题目生成的完整提示词
pub fn build_mcq_generation_prompt(
    subject: &str,
    main_topic: &str,
    subtopic: &str,
    difficulty: Difficulty,
    num_questions: usize,
    include_few_shot: bool,
) -> String {
    let mut parts: Vec<String> = vec![
        SYSTEM_PROMPT.to_string(),
        String::new(),
        DIFFICULTY_DEFINITIONS.to_string(),
        String::new(),
        "**Your Task:**".to_string(),
        format!(
            "Generate {} multiple-choice question(s) with the following parameters:",
            num_questions
        ),
        format!("- Subject: {}", subject),
        format!("- Main Topic: {}", main_topic),
        format!("- Sub-topic: {}", subtopic),
        format!("- Difficulty Level: {}", difficulty),
        String::new(),
        "**Requirements:**".to_string(),
        "1. Each MCQ must have:".to_string(),
        "   - A clear, specific question in English".to_string(),
        "   - Exactly 4 options (A, B, C, D)".to_string(),
        "   - All options must be plausible and distinct".to_string(),
        "   - Exactly one correct answer".to_string(),
        "   - A detailed explanation that teaches the concept".to_string(),
        "   - At least 2 credible references (academic websites or textbook citations)".to_string(),
        String::new(),
        format!(
            "2. Match the difficulty level:\n   - {}: {}",
            difficulty,
            difficulty_hint(difficulty)
        ),
        String::new(),
        "3. Ensure technical accuracy - verify all facts, formulas, and concepts".to_string(),
        String::new(),
    ];

    if include_few_shot {
        parts.push("**Examples of well-formed MCQs:**".to_string());
        parts.push(String::new());
        for (i, example) in select_relevant_examples(difficulty).iter().enumerate() {
            parts.push(format!(
                "Example {} ({} difficulty):",
                i + 1,
                example.difficulty
            ));
            parts.push(format!("Topic: {}", example.subtopic));
            parts.push("```json".to_string());
            parts.push(example.example.to_string());
            parts.push("```".to_string());
            parts.push(String::new());
        }
    }

    parts.push(output_format_block(num_questions));
    parts.push(String::new());
    parts.push(format!(
        "Now generate {} question(s) following all requirements above:",
        num_questions
    ));

    parts.join("\n")
}

/// 从上下文文本猜测图表类型
pub fn diagram_type_hint(text: &str) -> &'static str {
    let text_lower = text.to_lowercase();

    const TYPE_KEYWORDS: [(&str, &[&str]); 6] = [
        (
            "phase diagram",
            &["phase diagram", "equilibrium diagram", "binary diagram"],
        ),
        ("graph", &["graph", "plot", "curve", "chart"]),
        ("circuit", &["circuit", "schematic", "wiring"]),
        ("flowchart", &["flowchart", "flow chart", "process flow"]),
        ("structure", &["crystal structure", "molecular structure", "structure"]),
        ("table", &["table", "data table"]),
    ];

    for (diagram_type, keywords) in TYPE_KEYWORDS {
        if keywords.iter().any(|kw| text_lower.contains(kw)) {
            return diagram_type;
        }
    }
    "diagram"
}

/// 构建多模态题目生成的完整提示词
pub fn build_multimodal_prompt(
    text_context: &str,
    num_images: usize,
    difficulty: Difficulty,
    subject: &str,
    main_topic: &str,
    subtopic: &str,
    num_questions: usize,
) -> String {
    let image_ref = if num_images == 1 {
        "the diagram shown".to_string()
    } else {
        format!("the {} diagrams/images provided", num_images)
    };
    let diagram_type = diagram_type_hint(text_context);

    let mut parts: Vec<String> = vec![
        MULTIMODAL_SYSTEM_PROMPT.to_string(),
        String::new(),
        "**Context and Diagram(s):**".to_string(),
        format!(
            "You have been provided with {} and the following context:",
            image_ref
        ),
        String::new(),
        "```".to_string(),
        text_context.to_string(),
        "```".to_string(),
        String::new(),
        "**Your Task:**".to_string(),
        format!("Generate {} multiple-choice question(s) that:", num_questions),
        format!("- **Requires interpreting {} to answer**", image_ref),
        format!("- Tests understanding of the {}", diagram_type),
        format!("- Subject: {}", subject),
        format!("- Main Topic: {}", main_topic),
        format!("- Sub-topic: {}", subtopic),
        format!("- Difficulty Level: {}", difficulty),
        String::new(),
        "**Requirements:**".to_string(),
        "1. The question MUST require looking at the image(s) to answer correctly".to_string(),
        "2. Reference specific elements visible in the diagram".to_string(),
        "3. Provide 4 distinct options (A, B, C, D)".to_string(),
        "4. Include a detailed explanation that references visual evidence".to_string(),
        "5. Provide at least 2 credible references".to_string(),
        String::new(),
    ];

    parts.push(output_format_block(num_questions));
    parts.push(String::new());
    parts.push(format!(
        "Now generate {} diagram-based question(s):",
        num_questions
    ));

    parts.join("\n")
}
