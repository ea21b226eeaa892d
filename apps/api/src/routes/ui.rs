use axum::response::Html;

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Resume Insight Chatbot</title>
</head>
<body>
  <h1>Resume Insight Chatbot</h1>
  <p>Upload your resume and answer a few questions to tailor your career path.</p>
  <form method="post" enctype="multipart/form-data" action="/api/v1/sessions">
    <label>Upload your resume (PDF)
      <input type="file" name="resume" accept="application/pdf,.pdf">
    </label>
    <p>
      <button type="submit" formaction="/api/v1/resumes/extract">Preview extracted data</button>
      <button type="submit">Start Interview</button>
    </p>
  </form>
  <p>When the interview starts, answer the spoken questions into your microphone.</p>
  <p><a href="/api/v1/record">Download extracted info</a></p>
</body>
</html>
"#;

/// GET /
pub async fn upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}
