#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    tests! {
        associativity in assignment is OK
        "c"
        "c"
        "c"
    }

    tests! {
        global in assignment is OK
        "before"
        "after"
        "argument"
    }

    tests! {
        local in assignment is OK
        "before"
        "after"
    }

    tests! {
        returns_value in assignment is OK
        "var"
        "var"
    }

    tests! {
        grouping in assignment is ERR
        "[line 2] Error at '=': Invalid assignment target"
    }

    tests! {
        to_this in assignment is ERR
        "[line 3] Error at '=': Invalid assignment target"
    }

    tests! {
        undefined in assignment is ERR
        "Undefined variable 'unknown'"
        "[line 1]"
    }
}
