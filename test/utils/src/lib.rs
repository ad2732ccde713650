pub fn ollama_show_fixture(quantization_level: &str) -> String {
    return format!(
        r#"{{
  "modelfile": "FROM qwen2.5:0.5b-instruct",
  "parameters": "stop \"<|im_end|>\"",
  "template": "{{{{ .Prompt }}}}",
  "details": {{
    "parent_model": "",
    "format": "gguf",
    "family": "qwen2",
    "families": ["qwen2"],
    "parameter_size": "494.03M",
    "quantization_level": "{quantization_level}"
  }}
}}"#
    );
}

pub fn ollama_chat_fixture(content: &str) -> String {
    return format!(
        r#"{{
  "model": "qwen2.5:0.5b-instruct",
  "created_at": "2024-09-20T10:00:00.000000Z",
  "message": {{
    "role": "assistant",
    "content": "{content}"
  }},
  "done_reason": "stop",
  "done": true,
  "total_duration": 4883583458,
  "eval_count": 24
}}"#
    );
}

pub fn openai_chat_fixture(content: &str) -> String {
    return format!(
        r#"{{
  "id": "chatcmpl-123",
  "object": "chat.completion",
  "created": 1726826400,
  "model": "qwen2.5-0.5b-instruct",
  "choices": [
    {{
      "index": 0,
      "message": {{
        "role": "assistant",
        "content": "{content}"
      }},
      "finish_reason": "stop"
    }}
  ],
  "usage": {{
    "prompt_tokens": 24,
    "completion_tokens": 12,
    "total_tokens": 36
  }}
}}"#
    );
}
