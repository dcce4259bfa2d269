pub const FLASHCARD_RETRIEVAL_QUERY: &str = "Key study concepts worth memorising: definitions, principles, \
main ideas likely to appear in an exam.";

pub const QUIZ_RETRIEVAL_QUERY: &str = "Core concepts, definitions, principles and key facts used \
for exam revision.";

pub fn answer_retrieval_query(question: &str) -> String {
    format!(
        "Concepts, definitions, principles, formulas and important study material related to: {question}"
    )
}

pub fn flashcard_prompt(count: usize, context: &str) -> String {
    format!(
        r#"You are a study assistant helping a student prepare for an exam.

Use ONLY the information in the material below.
Do not guess. Do not write generic statements.
Write in the same language as the material.

TASK:
- Create {count} study flashcards.
- Each flashcard covers exactly one idea.
- Prefer definitions, principles and facts likely to be examined.

REQUIREMENTS:
- Clear questions.
- Short, precise answers suitable for quick recall.

Return ONLY a JSON array, no prose, in this shape:
[
  {{
    "question": "Review question",
    "answer": "Short answer"
  }}
]

MATERIAL:
"""
{context}
""""#
    )
}

pub fn quiz_prompt(count: usize, context: &str) -> String {
    format!(
        r#"You are a study assistant helping a student revise.

Use ONLY the information in the material below. Do not invent facts.
If the material is thin, ask about its general concepts.
Write in the same language as the material.

TASK:
- Create {count} multiple-choice review questions.
- Focus on definitions and principles.
- Each question has four options labelled A, B, C and D with exactly one correct option.

Return ONLY a JSON array, no prose, in this shape:
[
  {{
    "question": "...",
    "options": {{
      "A": "...",
      "B": "...",
      "C": "...",
      "D": "..."
    }},
    "correct_answer": "A"
  }}
]

MATERIAL:
"""
{context}
""""#
    )
}

pub fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a study assistant.

RULES:
- Use only the information in the material.
- Answer briefly and clearly, in a study style (definitions, explanations, bullet points).
- No generic filler. No speculation.
- Answer in the language of the question.

MATERIAL:
"""
{context}
"""

QUESTION:
{question}

ANSWER:"#
    )
}
