use ocrhub_derive::ocrhub_error;
use std::borrow::Cow;

#[ocrhub_error]
pub enum DemoError {
    #[public("Unsupported file type")]
    #[error("Rejected upload{}: {filename}", format_context(.context))]
    Rejected { filename: String, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Engine error{}: {message}", format_context(.context))]
    Engine { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn missing_file() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "page-1.jpg"))
}

#[test]
fn source_errors_convert_with_context() {
    let err = missing_file().context("Reading rasterized page").unwrap_err();

    assert!(matches!(err, DemoError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (Reading rasterized page): page-1.jpg");
}

#[test]
fn question_mark_converts_without_context() {
    fn run() -> Result<(), DemoError> {
        missing_file()?;
        Ok(())
    }

    let err = run().unwrap_err();
    assert_eq!(err.to_string(), "IO error: page-1.jpg");
}

#[test]
fn context_is_attached_to_own_results() {
    let res: Result<(), DemoError> =
        Err(DemoError::Engine { message: "exit status 1".into(), context: None });

    let err = res.context("tesseract").unwrap_err();
    assert_eq!(err.to_string(), "Engine error (tesseract): exit status 1");
}

#[test]
fn strings_map_to_internal_variant() {
    let from_static: DemoError = "boom".into();
    let from_owned: DemoError = String::from("bang").into();

    assert!(matches!(from_static, DemoError::Internal { .. }));
    assert_eq!(from_owned.to_string(), "Internal error: bang");
}

#[test]
fn kind_reports_variant_name() {
    let err: DemoError = "boom".into();
    assert_eq!(err.kind(), "Internal");

    let err = DemoError::Engine { message: "x".into(), context: None };
    assert_eq!(err.kind(), "Engine");
}

#[test]
fn public_message_hides_details_when_annotated() {
    let err = DemoError::Rejected { filename: "../../etc/passwd".into(), context: None };
    assert_eq!(err.public_message(), "Unsupported file type");
    assert_eq!(err.to_string(), "Rejected upload: ../../etc/passwd");

    let err = DemoError::Engine { message: "exit status 1".into(), context: None };
    assert_eq!(err.public_message(), err.to_string());
}
