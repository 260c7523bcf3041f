#[macro_use]
mod common;

#[cfg(test)]
mod _super {
    tests! {
        call_same_method in super is OK
        "Derived.foo()"
        "Base.foo()"
    }

    tests! {
        call_other_method in super is OK
        "Derived.bar()"
        "Base.foo()"
    }

    tests! {
        constructor in super is OK
        "Derived.init()"
        "Base.init(a, b)"
    }

    tests! {
        indirectly_inherited in super is OK
        "C.foo()"
        "A.foo()"
    }

    tests! {
        closure in super is OK
        "Base"
    }

    tests! {
        no_superclass in super is ERR
        "[line 2] Error at 'super': Cannot use 'super' in a class with no superclass"
    }

    tests! {
        at_top_level in super is ERR
        "[line 1] Error at 'super': Cannot use 'super' outside of a class"
    }

    tests! {
        missing_method in super is ERR
        "Undefined property 'bar'."
        "[line 3]"
    }
}
