use std::io::{self, Read};

use anyhow::Result;
use atty::Stream;
use dialoguer::Password;

// Reads a secret value without echoing it back. When stdin is a pipe rather
// than a terminal, the whole stream is the value (newlines included), so that
// `echo "hunter2" | worker-secrets put KEY` works.
pub fn get_secret_value(prompt_string: &str) -> Result<String> {
    let input = if atty::is(Stream::Stdin) {
        Password::new()
            .with_prompt(prompt_string)
            .allow_empty_password(true)
            .interact()?
    } else {
        let mut piped = String::new();
        io::stdin().read_to_string(&mut piped)?;
        piped
    };

    Ok(strip_trailing_whitespace(input))
}

fn strip_trailing_whitespace(mut input: String) -> String {
    input.truncate(input.trim_end().len());
    input
}

// Truncate all "yes", "no" responses for interactive prompt to just "y" or "n".
const INTERACTIVE_RESPONSE_LEN: usize = 1;
const YES: &str = "y";
const NO: &str = "n";

// For interactively handling destructive commands (and discouraging accidental deletes).
// Input like "yes", "Yes", "no", "No" will be accepted, thanks to the whitespace-stripping
// and lowercasing logic below.
pub fn confirm(prompt_string: &str) -> Result<bool> {
    println!("{} [y/n]", prompt_string);
    let mut response: String = read!("{}\n");
    response = response.split_whitespace().collect(); // remove whitespace
    response.make_ascii_lowercase(); // ensure response is all lowercase
    response.truncate(INTERACTIVE_RESPONSE_LEN); // at this point, all valid input will be "y" or "n"
    match response.as_ref() {
        YES => Ok(true),
        NO => Ok(false),
        _ => anyhow::bail!("Response must either be \"y\" for yes or \"n\" for no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_trims_trailing_whitespace_chars() {
        let test_str = "mysecret\r\n".to_string();

        let truncated_str = strip_trailing_whitespace(test_str);
        assert_eq!(truncated_str, "mysecret")
    }

    #[test]
    fn it_preserves_leading_whitespace() {
        let test_str = "  spaced out\n".to_string();

        let truncated_str = strip_trailing_whitespace(test_str);
        assert_eq!(truncated_str, "  spaced out")
    }
}
