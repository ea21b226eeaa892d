// Résumé extraction prompt template.

pub const RESUME_EXTRACT_PROMPT: &str = r#"Extract the following from this resume text:
- First Name
- Last Name
- Current Role
- Skillset (as a list)

Resume Text:
{resume_text}

Calculate the following using extracted data:
- Relevant Skills (10 missing skills relevant to Current Role)
- Skill Gap (think of 10 skills that are most relevant to the current role, then give a score out of 10 based on how many of those skills are present in the resume; 0 means no skill gap and 10 means a complete skill gap)

Return the output in JSON format using exactly these keys:
{
  "First Name": "string",
  "Last Name": "string",
  "Current Role": "string",
  "Skillset": ["string"],
  "Relevant Skills": ["string", ... 10 items],
  "Skill Gap": integer 0-10
}"#;
