use csv_email_flagger::transform::{transform_parallel, transform_sequential};
use csv_email_flagger::TransformError;

fn run_parallel(input: &[u8], workers: usize) -> Result<String, TransformError> {
    let mut output = Vec::new();
    transform_parallel(input, &mut output, workers)?;
    Ok(String::from_utf8(output).expect("output is UTF-8"))
}

fn run_sequential(input: &[u8]) -> Result<String, TransformError> {
    let mut output = Vec::new();
    transform_sequential(input, &mut output)?;
    Ok(String::from_utf8(output).expect("output is UTF-8"))
}

/// A varied input: emails, non-emails, blanks, ragged widths, quoting.
fn large_input(rows: usize) -> Vec<u8> {
    let mut input = String::from("id,name,contact\n");
    for i in 0..rows {
        match i % 5 {
            0 => input.push_str(&format!("{i},person{i},user{i}@example.com\n")),
            1 => input.push_str(&format!("{i},person{i},no-contact\n")),
            2 => input.push_str(" , ,\n"),
            3 => input.push_str(&format!("{i},\"person, {i}\",x{i}@mail.co.uk\n")),
            _ => input.push_str(&format!("{i},short\n")),
        }
    }
    input.into_bytes()
}

#[test]
fn output_matches_sequential_for_any_worker_count() {
    let input = large_input(500);
    let expected = run_sequential(&input).unwrap();
    for workers in [1, 2, 4, 8] {
        let got = run_parallel(&input, workers).unwrap();
        assert_eq!(got, expected, "worker_count={workers}");
    }
}

#[test]
fn annotates_rows_and_extends_header() {
    let got = run_parallel(b"name,email\nAlice,alice@example.com\nBob,not-an-email\n", 2).unwrap();
    assert_eq!(
        got,
        "name,email,hasEmail\nAlice,alice@example.com,true\nBob,not-an-email,false\n"
    );
}

#[test]
fn header_with_existing_flag_column_is_left_unchanged() {
    let got = run_parallel(b"name,hasemail\nAlice,alice@example.com\n", 4).unwrap();
    assert_eq!(got, "name,hasemail\nAlice,alice@example.com,true\n");
}

#[test]
fn blank_rows_do_not_shift_subsequent_output() {
    let input = b"a,b\nfirst,x\n , \nsecond,e@f.gh\n";
    let got = run_parallel(input, 4).unwrap();
    assert_eq!(got, "a,b,hasEmail\nfirst,x,false\nsecond,e@f.gh,true\n");
}

#[test]
fn empty_input_fails_with_empty_input_error() {
    for workers in [1, 4] {
        let err = run_parallel(b"", workers).unwrap_err();
        assert!(matches!(err, TransformError::EmptyInput));
    }
}

#[test]
fn header_only_input_succeeds() {
    let got = run_parallel(b"name,email\n", 8).unwrap();
    assert_eq!(got, "name,email,hasEmail\n");
}

#[test]
fn undecodable_record_fails_in_both_modes_alike() {
    let input: &[u8] = b"name,email\nok,row\nAl\xff\xfeice,x\nafter,row\n";
    let sequential_err = run_sequential(input).unwrap_err();
    let parallel_err = run_parallel(input, 4).unwrap_err();
    assert!(matches!(
        sequential_err,
        TransformError::MalformedInput { row: 3, .. }
    ));
    assert!(matches!(
        parallel_err,
        TransformError::MalformedInput { row: 3, .. }
    ));
}

#[test]
fn single_worker_handles_a_long_stream() {
    let input = large_input(2000);
    let expected = run_sequential(&input).unwrap();
    let got = run_parallel(&input, 1).unwrap();
    assert_eq!(got, expected);
}
