#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use glox::glox;

            let mut expected = vec![$($expected),*];

            // Join the expected lines with newlines, plus a trailing
            // newline when there is any output at all.
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output = Vec::new();
            let mut glox = glox::new(&mut output);

            glox.run_file(format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file)));

            // Drop glox here to release the borrow before reading the output.
            drop(glox);
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file));

            Command::cargo_bin("glox").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .failure();
        }
    };
}
