//! Solidity interfaces of the contracts the module calls
//!
//! `IERC20` covers every pair contract. `IERC20MinterBurner` is the extra
//! surface of the wrapper deployed by `RegisterCoin`, which the module owns:
//!
//! ```text
//! constructor(string name, string symbol, uint8 decimals)
//! mint(address,uint256) / burnCoins(address,uint256)   module only
//! burn(uint256)                                         caller's own balance
//! ```

use alloy_primitives::U256;
use alloy_sol_types::sol;
use cosmwasm_std::Uint256;

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }

    interface IERC20MinterBurner {
        function mint(address to, uint256 amount) external;
        function burnCoins(address from, uint256 amount) external;
        function burn(uint256 amount) external;
    }

    /// Constructor arguments appended to the wrapper creation code
    struct WrapperInit {
        string name;
        string symbol;
        uint8 decimals;
    }
}

pub fn to_u256(value: Uint256) -> U256 {
    U256::from_be_bytes(value.to_be_bytes())
}

pub fn from_u256(value: U256) -> Uint256 {
    Uint256::from_be_bytes(value.to_be_bytes::<32>())
}
